//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for readpulse using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::storage::ActivityKind;

/// ReadPulse - reader engagement tracking and category recommendations
#[derive(Parser)]
#[command(name = "readpulse")]
#[command(version)]
#[command(about = "Reader engagement tracking and category recommendations", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run database migrations
    Migrate,

    /// Record one engagement signal
    Track {
        reader_id: String,
        article_id: String,

        /// view, read, like, bookmark, click, share
        #[arg(long, default_value = "view")]
        kind: ActivityKind,

        /// Time spent in seconds
        #[arg(long, default_value_t = 0.0)]
        duration: f64,

        /// Scroll depth percentage (0-100)
        #[arg(long)]
        scroll: Option<f64>,

        /// Recommendation kind, marks the signal as a recommendation click
        #[arg(long)]
        recommendation_kind: Option<String>,
    },

    /// Reading statistics for a reader
    Stats {
        reader_id: String,

        /// Window length in days (default: engagement.stats_window_days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Top categories by reading time
    TopCategories {
        reader_id: String,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Category-based recommendations, logged as a served batch
    Recommend {
        reader_id: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Do not write the served batch to the recommendation log
        #[arg(long)]
        no_log: bool,
    },

    /// Recommendation click-through analytics
    Analytics {
        /// Window length in days (default: analytics.default_window_days)
        #[arg(long)]
        days: Option<u32>,

        /// Only count this recommendation kind
        #[arg(long)]
        kind: Option<String>,
    },

    /// Recently read articles (context for external rankers)
    Recent {
        reader_id: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Export engagement activities as JSON
    ExportActivities {
        /// Only export this reader
        #[arg(long)]
        reader: Option<String>,

        #[arg(long, default_value_t = 1000)]
        limit: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
