//! Configuration management for procfs-collector.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use procfs_processes_collector::process::DEFAULT_PROC_PATH;
use procfs_processes_collector::{CollectorOptions, CounterScale};
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9256;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Result type of the config helpers.
pub type ConfigResult<T> = anyhow::Result<T>;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Collector configuration. Every field is optional so partial files merge
/// over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub bind: Option<String>,
    pub port: Option<u16>,

    // Logging
    pub log_level: Option<String>,

    // Collection
    #[serde(alias = "proc-path")]
    pub proc_path: Option<PathBuf>,
    #[serde(alias = "include-system-processes")]
    pub include_system_processes: Option<bool>,
    /// Multiply CPU time and page fault counters by 10000
    #[serde(alias = "legacy-counter-scaling")]
    pub legacy_counter_scaling: Option<bool>,
    /// Scan deadline in milliseconds; unset means no deadline
    #[serde(alias = "scan-timeout-ms")]
    pub scan_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            proc_path: Some(PathBuf::from(DEFAULT_PROC_PATH)),
            include_system_processes: Some(false),
            legacy_counter_scaling: Some(false),
            scan_timeout_ms: None,
        }
    }
}

impl Config {
    /// Effective procfs root.
    pub fn proc_path(&self) -> PathBuf {
        self.proc_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_PATH))
    }

    /// Translates the effective config into per-cycle collector settings.
    pub fn to_collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            proc_path: self.proc_path(),
            include_system_processes: self.include_system_processes.unwrap_or(false),
            scale: CounterScale::from_legacy_flag(self.legacy_counter_scaling.unwrap_or(false)),
            scan_timeout: self.scan_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> ConfigResult<()> {
    if cfg.port == Some(0) {
        bail!("port must be non-zero");
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            bail!("Invalid bind address '{}'", bind);
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level) {
            bail!(
                "Invalid log_level '{}', expected one of {}",
                level,
                LOG_LEVELS.join("/")
            );
        }
    }

    if cfg.scan_timeout_ms == Some(0) {
        bail!("scan_timeout_ms must be greater than zero when set");
    }

    let proc_path = cfg.proc_path();
    match fs::metadata(&proc_path) {
        Ok(meta) if !meta.is_dir() => {
            bail!("proc_path is not a directory: {}", proc_path.display());
        }
        Err(e) => {
            bail!("proc_path is not accessible: {} ({})", proc_path.display(), e);
        }
        Ok(_) => {}
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> ConfigResult<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    if let Some(proc_path) = &args.proc_path {
        config.proc_path = Some(proc_path.clone());
    }

    // Boolean switches can only turn features on
    if args.include_system_processes {
        config.include_system_processes = Some(true);
    }
    if args.legacy_counter_scaling {
        config.legacy_counter_scaling = Some(true);
    }

    if let Some(ms) = args.scan_timeout_ms {
        config.scan_timeout_ms = Some(ms);
    }

    Ok(config)
}

/// Configuration loading with multiple format support. Missing keys fall back
/// to their defaults.
pub fn load_config(path: Option<&Path>) -> ConfigResult<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/procfs-collector/collector.yaml",
                "/etc/procfs-collector/collector.yml",
                "/etc/procfs-collector/collector.json",
                "./procfs-collector.yaml",
                "./procfs-collector.yml",
                "./procfs-collector.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(found) => PathBuf::from(found),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Err(anyhow!("Config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(&path)?;

    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(loaded.merged_over(Config::default()))
}

impl Config {
    /// Fills every unset field from `base`.
    fn merged_over(self, base: Config) -> Config {
        Config {
            bind: self.bind.or(base.bind),
            port: self.port.or(base.port),
            log_level: self.log_level.or(base.log_level),
            proc_path: self.proc_path.or(base.proc_path),
            include_system_processes: self
                .include_system_processes
                .or(base.include_system_processes),
            legacy_counter_scaling: self.legacy_counter_scaling.or(base.legacy_counter_scaling),
            scan_timeout_ms: self.scan_timeout_ms.or(base.scan_timeout_ms),
        }
    }
}

/// Renders configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> ConfigResult<String> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> ConfigResult<()> {
    let output = render_config(config, &format)?;
    println!("{output}");
    Ok(())
}
