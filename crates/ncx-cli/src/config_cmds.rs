use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use ncx_config::{EngineConfig, validate_config};
use ncx_core::types::OutputFormat;

pub(crate) fn handle_config_show(config: &EngineConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json_str = serde_json::to_string_pretty(config)?;
            println!("{}", json_str);
        }
        OutputFormat::Text => {
            let toml_str = toml::to_string_pretty(config)?;
            print!("{}", toml_str);
        }
    }
    Ok(())
}

pub(crate) fn handle_config_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(path)?;
    write_template(&path, force)?;
    eprintln!("Generated engine config template at: {}", path.display());
    Ok(())
}

pub(crate) fn handle_config_validate(config: &EngineConfig) -> Result<()> {
    validate_config(config)?;
    eprintln!(
        "Configuration is valid ({} service override(s))",
        config.services.len()
    );
    Ok(())
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => EngineConfig::config_path(),
    }
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    EngineConfig::save_default_template(path)
}
