//! CLI arguments and subcommands for procfs-collector.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for query results
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procfs-collector",
    about = "Per-process and per-state metrics collected from procfs",
    long_about = "Per-process and per-state metrics collected from procfs.\n\n\
                  Scans every process under the procfs root and answers hierarchical \
                  metric queries such as process/<name>/<pid>/<metric>, \
                  process/<name>/ps_count and state/<state>. Without a subcommand the \
                  collector serves queries over HTTP.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the procfs mount to scan
    #[arg(long)]
    pub proc_path: Option<PathBuf>,

    /// Also report processes with an empty command line (kernel threads)
    #[arg(long)]
    pub include_system_processes: bool,

    /// Multiply CPU time and page fault counters by 10000
    #[arg(long)]
    pub legacy_counter_scaling: bool,

    /// Stop reading further pids once a scan has run this long
    #[arg(long)]
    pub scan_timeout_ms: Option<u64>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one collection cycle and print the resolved metrics
    Query {
        /// Query paths, e.g. process/*/ps_count or state/sleeping
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// List the metric templates the collector answers
    Metrics {
        /// Show units and descriptions
        #[arg(long)]
        verbose: bool,
    },

    /// Validate configuration and the procfs root
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
