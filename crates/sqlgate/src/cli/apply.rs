use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use console::style;

use sqlgate::db::MySqlProvider;
use sqlgate::log::LogChannel;
use sqlgate::migrations::MigrationOutcome;
use sqlgate::MigrationPlan;

/// Apply a plan to the configured server.
#[derive(Parser)]
pub struct ApplyCommand {
    /// Plan file path.
    #[arg(short, long)]
    pub plan: String,

    /// Configuration file path.
    #[arg(short, long, default_value = "sqlgate.toml")]
    pub config: String,

    /// Accepted for compatibility; the stored version is never written.
    #[arg(long)]
    pub no_increase_version: bool,

    /// Print gate decisions as they are made.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ApplyCommand {
    pub async fn execute(self) -> Result<()> {
        let config = super::load_config(&self.config)?;
        let plan = MigrationPlan::from_file(&self.plan)?;
        let target = plan.schema_version;
        let database = plan.database.name.clone();

        let mut script = plan.into_script(config.database, Arc::new(MySqlProvider::new()))?;
        if self.verbose {
            script = script.attach_logger(LogChannel::Debug, |msg| {
                println!("  {} {}", style("·").dim(), msg);
            });
        }

        println!();
        println!(
            "  {} Applying {} to {} (version {})",
            style("→").dim(),
            style(&self.plan).bold(),
            style(&database).cyan(),
            target
        );

        match script.execute(!self.no_increase_version).await? {
            MigrationOutcome::Applied {
                from, statements, ..
            } => {
                let from = from.map_or_else(|| "none".to_string(), |v| v.to_string());
                println!(
                    "  {} Applied {} statement(s) (stored version: {})",
                    style("✓").green(),
                    statements,
                    from
                );
            }
            MigrationOutcome::Skipped { current, .. } => {
                println!(
                    "  {} Skipped: {} is already at version {}",
                    style("ℹ").blue(),
                    database,
                    current
                );
            }
        }
        println!();

        Ok(())
    }
}
