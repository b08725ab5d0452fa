//! ReadPulse - reader engagement tracking and category recommendations
//!
//! This library records how readers interact with articles, folds rapid
//! repeated signals into session-level records, derives per-reader topic
//! preferences, recommends unseen articles from those topics and audits
//! click-through on served recommendations.
//!
//! # Features
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `storage`: SeaORM backend and the narrow repository traits
//! - `services`: Recorder, stats aggregator, recommender, auditor, legacy tracker
//! - `config`: Configuration management
//! - `interfaces`: Command-line interface
//! - `system`: Logging setup

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
