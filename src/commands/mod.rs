//! CLI command implementations for procfs-collector.
//!
//! This module provides implementations for all CLI subcommands:
//! - `query`: One collection cycle for the given query paths
//! - `metrics`: Metric template listing
//! - `check`: Configuration and procfs validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod metrics;
pub mod query;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use metrics::command_metrics;
pub use query::command_query;
