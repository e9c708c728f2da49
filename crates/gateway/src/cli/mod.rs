pub mod chat;
pub mod config;
pub mod doctor;
pub mod run;

use clap::{Parser, Subcommand};

/// Wonderland — a conversation-to-record account agent.
#[derive(Debug, Parser)]
#[command(name = "wonderland", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the agent server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Send a single message to the agent and print the reply.
    Run {
        /// The message to send.
        message: String,
        /// Session key (defaults to "cli:run").
        #[arg(long, default_value = "cli:run")]
        session: String,
        /// Output the reply and LogTrail as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat against the agent in this terminal.
    Chat {
        /// Session key to converse under.
        #[arg(long, default_value = "main")]
        session: String,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `WONDERLAND_CONFIG`
/// (or `wonderland.toml` by default).  Returns the parsed [`Config`] and
/// the path that was used.
///
/// Shared by `serve`, `doctor`, and `config` subcommands so the logic
/// lives in one place.
pub fn load_config() -> anyhow::Result<(wl_domain::config::Config, String)> {
    let config_path =
        std::env::var("WONDERLAND_CONFIG").unwrap_or_else(|_| "wonderland.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        wl_domain::config::Config::default()
    };

    Ok((config, config_path))
}
