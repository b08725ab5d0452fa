//! Migrate command

use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

/// Migrations already ran while connecting; this just reports the backend.
pub async fn migrate(storage: Arc<SeaOrmStorage>) -> Result<(), CliError> {
    println!(
        "{} {} schema is up to date",
        "✓".bold().green(),
        storage.get_backend_name().to_uppercase().cyan()
    );
    Ok(())
}
