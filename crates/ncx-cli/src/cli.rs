use clap::{Parser, Subcommand};
use ncx_core::types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ncx")]
#[command(about = "Credential pairing and admission planner for network auth audits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Engine config file (defaults to ~/.config/ncx/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise debug level (repeatable; -vvvvvvvvv traces the retry pool)
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dry-run the scheduler against a service and print the attempt order
    Plan {
        /// Service to plan for: <service>://<host>[:<port>]
        target: String,

        /// Username wordlist
        #[arg(long, short = 'U')]
        users: PathBuf,

        /// Password wordlist
        #[arg(long, short = 'P')]
        passwords: PathBuf,

        /// Try every password for a user before moving to the next user
        #[arg(long)]
        passwords_first: bool,

        /// Stop after this many attempts
        #[arg(long)]
        limit: Option<u64>,

        /// Ideal parallelism to plan with (clamped into the connection limits)
        #[arg(long)]
        parallelism: Option<u32>,
    },

    /// Show/manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the default configuration template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate configuration file
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "ncx",
            "plan",
            "ssh://10.0.0.1",
            "-U",
            "users.txt",
            "-P",
            "pass.txt",
            "--passwords-first",
            "--limit",
            "5",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Plan {
                target,
                passwords_first,
                limit,
                ..
            } => {
                assert_eq!(target, "ssh://10.0.0.1");
                assert!(passwords_first);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("Expected Plan"),
        }
    }

    #[test]
    fn test_plan_requires_wordlists() {
        assert!(Cli::try_parse_from(["ncx", "plan", "ssh://host"]).is_err());
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["ncx", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                cmd: ConfigCommands::Init { force: true }
            }
        ));
    }
}
