mod apply;
mod render;
mod status;

pub use apply::ApplyCommand;
pub use render::RenderCommand;
pub use status::StatusCommand;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqlgate::config::{GateConfig, LoggingConfig};

/// sqlgate - version-gated MySQL/MariaDB schema migrations
#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the statements a plan would queue.
    Render(RenderCommand),

    /// Apply a plan if the target database is behind it.
    Apply(ApplyCommand),

    /// Show whether a database exists and its stored schema version.
    Status(StatusCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Render(cmd) => cmd.execute(),
            Commands::Apply(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute().await,
        }
    }
}

/// Load `.env` and the configuration file, then install the subscriber.
fn load_config(path: &str) -> Result<GateConfig> {
    dotenvy::dotenv().ok();

    if !Path::new(path).exists() {
        anyhow::bail!(
            "Configuration file not found: {}\nCreate one with a [database] url entry.",
            path
        );
    }

    let config = GateConfig::from_file(path)?;
    config.database.validate()?;
    init_tracing(&config.logging);
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
