//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> anyhow::Result<()> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(default_file_name(&format)),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

fn default_file_name(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => "procfs-collector.yaml",
        ConfigFormat::Json => "procfs-collector.json",
        ConfigFormat::Toml => "procfs-collector.toml",
    }
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# procfs-collector Configuration
# ==============================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"                  # Bind IP (0.0.0.0 = all interfaces)
# port: 9256                       # HTTP port
#
# Logging
# -------
# log_level: "info"                # off, error, warn, info, debug, trace
#
# Collection
# ----------
# proc_path: "/proc"               # procfs root to scan
# include_system_processes: false  # Report processes with an empty command line
# legacy_counter_scaling: false    # Multiply CPU time and page faults by 10000
# scan_timeout_ms: null            # Stop reading pids after N ms (null = no limit)
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_file_loads_back() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("generated.yaml");
        command_config(Some(out.clone()), ConfigFormat::Yaml, true).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("# procfs-collector Configuration"));

        let loaded = crate::config::load_config(Some(&out)).unwrap();
        assert_eq!(loaded.port, Config::default().port);
    }
}
