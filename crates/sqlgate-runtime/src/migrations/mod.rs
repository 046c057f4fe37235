pub mod introspection;
mod script;

pub use script::{GateDecision, MigrationOutcome, MigrationScript};
