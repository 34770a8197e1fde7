//! Engine configuration.
//!
//! One `EngineConfig` is built per scan and handed to every scheduler at
//! construction; nothing reads it through ambient global state.

use anyhow::{Context, Result};
use ncx_core::EnumerationOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Debug level above which pool insertions/extractions are traced.
pub const POOL_TRACE_LEVEL: u8 = 8;

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    /// Admission defaults applied to every service.
    #[serde(default)]
    pub defaults: ServiceOptions,
    /// Per-service overrides keyed by service name (`ssh`, `ftp`, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub services: HashMap<String, ServiceOptions>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    /// Cross-product walk order.
    #[serde(default)]
    pub order: EnumerationOrder,
    /// Debug verbosity (0 = quiet).
    #[serde(default)]
    pub debugging: u8,
}

/// Admission parameters for a service. Unset fields mean "no limit" or
/// "inherit from defaults" depending on where the table appears.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_connection_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connection_limit: Option<u32>,
    /// Authentication attempts per connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_tries: Option<u32>,
    /// Delay between opening two connections, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_delay_ms: Option<u64>,
    /// Interrupted connections tolerated before giving up on retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,
}

impl ServiceOptions {
    /// Field-wise merge: values set on `self` win over `fallback`.
    pub fn or(&self, fallback: &ServiceOptions) -> ServiceOptions {
        ServiceOptions {
            min_connection_limit: self.min_connection_limit.or(fallback.min_connection_limit),
            max_connection_limit: self.max_connection_limit.or(fallback.max_connection_limit),
            auth_tries: self.auth_tries.or(fallback.auth_tries),
            connection_delay_ms: self.connection_delay_ms.or(fallback.connection_delay_ms),
            connection_retries: self.connection_retries.or(fallback.connection_retries),
            ssl: self.ssl.or(fallback.ssl),
        }
    }

    pub fn connection_delay(&self) -> Option<Duration> {
        self.connection_delay_ms.map(Duration::from_millis)
    }
}

impl EngineConfig {
    /// Config with defaults everywhere except the walk order.
    pub fn with_order(order: EnumerationOrder) -> Self {
        Self {
            engine: EngineSection {
                order,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn order(&self) -> EnumerationOrder {
        self.engine.order
    }

    pub fn debugging(&self) -> u8 {
        self.engine.debugging
    }

    /// Whether pool operations should be traced.
    pub fn traces_pool(&self) -> bool {
        self.engine.debugging > POOL_TRACE_LEVEL
    }

    /// Resolved admission options for a service.
    ///
    /// Lookup order: `[services.<name>]` -> `[defaults]`.
    pub fn options_for(&self, service: &str) -> ServiceOptions {
        match self.services.get(service) {
            Some(overrides) => overrides.or(&self.defaults),
            None => self.defaults.clone(),
        }
    }

    /// Load from the per-user config path.
    ///
    /// Returns `Default` if the file does not exist or if the config
    /// directory cannot be determined (e.g., no HOME in containers).
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(Self::default()),
        };
        if !path.exists() {
            debug!(path = %path.display(), "No engine config, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse engine config: {}", path.display()))?;
        debug!(
            path = %path.display(),
            order = %config.engine.order,
            services = config.services.len(),
            "Loaded engine config"
        );
        Ok(config)
    }

    /// Path to the per-user config file: `~/.config/ncx/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "ncx")
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize engine config")
    }

    /// Generate default config TOML with comments as a template.
    pub fn default_template() -> String {
        r#"# ncx engine configuration
# Location: ~/.config/ncx/config.toml

[engine]
order = "users-per-password"  # or "passwords-per-user"
debugging = 0                 # > 8 traces retry pool activity

# Admission defaults for every service. Unset keys mean "no limit".
[defaults]
# min_connection_limit = 1
# max_connection_limit = 10
# auth_tries = 3
# connection_delay_ms = 0
# connection_retries = 30
# ssl = false

# Per-service overrides. Same keys as [defaults].
#
# [services.ssh]
# max_connection_limit = 4
#
# [services.ftp]
# connection_delay_ms = 250
"#
        .to_string()
    }

    /// Write the default template to `path`, creating directories as needed.
    pub fn save_default_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, Self::default_template())
            .with_context(|| format!("Failed to write engine config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.order(), EnumerationOrder::UsersPerPassword);
        assert_eq!(config.debugging(), 0);
        assert!(!config.traces_pool());
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_traces_pool_threshold() {
        let mut config = EngineConfig::default();
        config.engine.debugging = POOL_TRACE_LEVEL;
        assert!(!config.traces_pool());
        config.engine.debugging = POOL_TRACE_LEVEL + 1;
        assert!(config.traces_pool());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[engine]
order = "passwords-per-user"
debugging = 3

[defaults]
min_connection_limit = 1
max_connection_limit = 10
connection_delay_ms = 250

[services.ssh]
max_connection_limit = 4
ssl = true
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.order(), EnumerationOrder::PasswordsPerUser);
        assert_eq!(config.debugging(), 3);
        assert_eq!(config.defaults.max_connection_limit, Some(10));
        assert_eq!(
            config.defaults.connection_delay(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.services["ssh"].max_connection_limit, Some(4));
    }

    #[test]
    fn test_options_for_merges_override_over_defaults() {
        let mut config = EngineConfig::default();
        config.defaults.min_connection_limit = Some(2);
        config.defaults.max_connection_limit = Some(10);
        config.services.insert(
            "ssh".to_string(),
            ServiceOptions {
                max_connection_limit: Some(4),
                ssl: Some(true),
                ..Default::default()
            },
        );

        let ssh = config.options_for("ssh");
        assert_eq!(ssh.min_connection_limit, Some(2));
        assert_eq!(ssh.max_connection_limit, Some(4));
        assert_eq!(ssh.ssl, Some(true));

        let ftp = config.options_for("ftp");
        assert_eq!(ftp.max_connection_limit, Some(10)); // falls back to defaults
        assert_eq!(ftp.ssl, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let dir = tempdir().unwrap();
        let err = EngineConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read engine config"));
    }

    #[test]
    fn test_load_from_invalid_toml_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\norder = \"sideways\"\n").unwrap();
        let err = EngineConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse engine config"));
    }

    #[test]
    fn test_default_template_parses() {
        let config: EngineConfig = toml::from_str(&EngineConfig::default_template()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_default_template_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        EngineConfig::save_default_template(&path).unwrap();
        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrips_overrides() {
        let mut config = EngineConfig::with_order(EnumerationOrder::PasswordsPerUser);
        config.services.insert(
            "ftp".to_string(),
            ServiceOptions {
                auth_tries: Some(2),
                ..Default::default()
            },
        );
        let rendered = config.to_toml().unwrap();
        let parsed: EngineConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
