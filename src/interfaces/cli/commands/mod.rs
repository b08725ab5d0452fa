//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_gen;
mod migrate;
mod reading;
mod recommendations;

pub use config_gen::*;
pub use migrate::*;
pub use reading::*;
pub use recommendations::*;
