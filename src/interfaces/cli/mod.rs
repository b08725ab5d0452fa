//! CLI interface module
//!
//! This module provides command-line interface functionality for readpulse.

pub mod commands;

use std::fmt;

use serde::Serialize;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::EngagementError;
use crate::services::EngagementEngine;
use crate::storage::StorageFactory;
use commands::{
    analytics, config_generate, export_activities, migrate, recent, recommend, stats,
    top_categories, track,
};

#[derive(Debug)]
pub enum CliError {
    Engagement(EngagementError),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::Engagement(err) => err.format_simple(),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::Engagement(err) => err.format_colored(),
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<EngagementError> for CliError {
    fn from(err: EngagementError) -> Self {
        CliError::Engagement(err)
    }
}

/// 以格式化 JSON 输出到 stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Engagement(EngagementError::from(e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generate doesn't need DB connection, handle it separately
    if let Commands::Config { action } = cmd {
        return match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
        };
    }

    let storage = StorageFactory::create().await?;

    if let Commands::Migrate = cmd {
        return migrate(storage).await;
    }

    let config = crate::config::get_config();
    let engine = EngagementEngine::new(storage, &config);

    match cmd {
        Commands::Track {
            reader_id,
            article_id,
            kind,
            duration,
            scroll,
            recommendation_kind,
        } => {
            track(
                &engine,
                &reader_id,
                &article_id,
                kind,
                duration,
                scroll,
                recommendation_kind,
            )
            .await
        }

        Commands::Stats { reader_id, days } => {
            let days = days.unwrap_or(config.engagement.stats_window_days);
            stats(&engine, &reader_id, days).await
        }

        Commands::TopCategories { reader_id, limit } => {
            top_categories(&engine, &reader_id, limit).await
        }

        Commands::Recommend {
            reader_id,
            limit,
            no_log,
        } => recommend(&engine, &reader_id, limit, !no_log).await,

        Commands::Analytics { days, kind } => {
            let days = days.unwrap_or(config.analytics.default_window_days);
            analytics(&engine, days, kind.as_deref()).await
        }

        Commands::Recent { reader_id, limit } => recent(&engine, &reader_id, limit).await,

        Commands::ExportActivities { reader, limit } => {
            export_activities(&engine, reader.as_deref(), limit).await
        }

        // 已在建立引擎前处理
        Commands::Migrate | Commands::Config { .. } => Ok(()),
    }
}
