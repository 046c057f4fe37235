use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use sqlgate::config::ConnectionConfig;
use sqlgate::db::MySqlProvider;
use sqlgate::MigrationPlan;

/// Print the statements a plan would queue, without connecting.
#[derive(Parser)]
pub struct RenderCommand {
    /// Plan file path.
    #[arg(short, long)]
    pub plan: String,
}

impl RenderCommand {
    pub fn execute(self) -> Result<()> {
        let plan = MigrationPlan::from_file(&self.plan)?;
        let script = plan.into_script(ConnectionConfig::default(), Arc::new(MySqlProvider::new()))?;

        for sql in script.statements() {
            println!("{}", sql);
        }
        Ok(())
    }
}
