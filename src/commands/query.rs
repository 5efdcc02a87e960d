//! Query command implementation.
//!
//! Runs one collection cycle and prints the resolved metrics.

use anyhow::Context;
use procfs_processes_collector::{CollectedMetric, Collector};

use crate::cli::OutputFormat;
use crate::config::Config;

/// Runs one cycle for `patterns` and prints the results.
pub fn command_query(
    patterns: &[String],
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<()> {
    let collector = Collector::new(config.to_collector_options());
    let metrics = collector
        .collect_paths(patterns)
        .with_context(|| format!("query failed for {}", patterns.join(", ")))?;

    println!("{}", render_metrics(&metrics, &format)?);
    Ok(())
}

/// Renders collected metrics in the requested format.
pub fn render_metrics(metrics: &[CollectedMetric], format: &OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(metrics)?,
        OutputFormat::Yaml => serde_yaml::to_string(metrics)?,
        OutputFormat::Text => {
            let width = metrics
                .iter()
                .map(|m| m.path.to_string().len())
                .max()
                .unwrap_or(0);
            metrics
                .iter()
                .map(|m| {
                    format!(
                        "{:width$}  {} {}",
                        m.path.to_string(),
                        m.value,
                        m.unit,
                        width = width
                    )
                    .trim_end()
                    .to_string()
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    })
}
