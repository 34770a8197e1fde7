use anyhow::Result;
use ncx_core::NcxError;
use tracing::warn;

use crate::config::{EngineConfig, ServiceOptions};

/// Validate an engine configuration.
/// Returns Ok(()) if valid, or Err with descriptive messages.
pub fn validate_config(config: &EngineConfig) -> Result<()> {
    validate_limits("defaults", &config.defaults)?;
    for (name, overrides) in &config.services {
        if name.is_empty() {
            anyhow::bail!("services table contains an empty service name");
        }
        validate_limits(name, &overrides.or(&config.defaults))?;
        if overrides == &ServiceOptions::default() {
            warn!(service = %name, "Service override table is empty");
        }
    }
    Ok(())
}

fn validate_limits(service: &str, options: &ServiceOptions) -> Result<()> {
    let min = options.min_connection_limit;
    let max = options.max_connection_limit;

    let invalid = |min: u32, max: u32| NcxError::InvalidConnectionLimits {
        service: service.to_string(),
        min,
        max,
    };

    match (min, max) {
        (Some(0), max) => Err(invalid(0, max.unwrap_or(0)).into()),
        (min, Some(0)) => Err(invalid(min.unwrap_or(0), 0).into()),
        (Some(min), Some(max)) if min > max => Err(invalid(min, max).into()),
        _ => Ok(()),
    }
}
