use anyhow::Result;
use clap::Parser;
use std::path::Path;

mod cli;
mod config_cmds;
mod plan_cmd;

use cli::{Cli, Commands, ConfigCommands};
use ncx_config::EngineConfig;
use plan_cmd::PlanArgs;

fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let output_format = cli.format.clone();

    match cli.command {
        Commands::Plan {
            target,
            users,
            passwords,
            passwords_first,
            limit,
            parallelism,
        } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            plan_cmd::handle_plan(
                config,
                PlanArgs {
                    target,
                    users,
                    passwords,
                    passwords_first,
                    limit,
                    parallelism,
                },
                output_format,
            )?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => {
                let config = load_config(cli.config.as_deref(), cli.verbose)?;
                config_cmds::handle_config_show(&config, output_format)?;
            }
            ConfigCommands::Init { force } => {
                config_cmds::handle_config_init(cli.config.as_deref(), force)?;
            }
            ConfigCommands::Validate => {
                let config = load_config(cli.config.as_deref(), cli.verbose)?;
                config_cmds::handle_config_validate(&config)?;
            }
        },
    }

    Ok(())
}

/// Explicit `--config` must exist; the per-user file falls back to defaults.
/// Each `-v` raises the configured debug level by one.
fn load_config(path: Option<&Path>, verbose: u8) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };
    config.engine.debugging = config.engine.debugging.saturating_add(verbose);
    Ok(config)
}
