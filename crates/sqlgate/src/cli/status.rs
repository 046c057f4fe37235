use anyhow::Result;
use clap::Parser;
use console::style;

use sqlgate::db::{ConnectionProvider, MySqlProvider};
use sqlgate::migrations::introspection;

/// Show database existence and stored schema version.
#[derive(Parser)]
pub struct StatusCommand {
    /// Database name.
    #[arg(short, long)]
    pub database: String,

    /// Configuration file path.
    #[arg(short, long, default_value = "sqlgate.toml")]
    pub config: String,
}

impl StatusCommand {
    pub async fn execute(self) -> Result<()> {
        let config = super::load_config(&self.config)?;
        let mut conn = MySqlProvider::new().acquire(&config.database).await?;

        println!();
        if !introspection::database_exists(conn.as_mut(), &self.database).await? {
            println!(
                "  {} Database {} does not exist",
                style("✗").red(),
                style(&self.database).cyan()
            );
            println!();
            return Ok(());
        }

        match introspection::schema_version(conn.as_mut(), &self.database).await? {
            Some(version) => println!(
                "  {} {} is at schema version {}",
                style("✓").green(),
                style(&self.database).cyan(),
                style(version).bold()
            ),
            None => println!(
                "  {} {} has no stored schema version (gated as {})",
                style("ℹ").blue(),
                style(&self.database).cyan(),
                introspection::MISSING_VERSION
            ),
        }
        println!();

        Ok(())
    }
}
