//! Check command implementation.
//!
//! Validates configuration and the procfs root.

use procfs_processes_collector::process::collect_proc_entries;
use procfs_processes_collector::{metric_types, Collector};

use crate::config::{validate_effective_config, Config};

/// Validates configuration, then runs one scan and prints the population by state.
/// Returns `Ok(false)` when any check failed.
pub fn command_check(config: &Config) -> anyhow::Result<bool> {
    println!("🔍 procfs-collector - System Check");
    println!("==================================");

    let mut all_ok = true;

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    // Check procfs root
    let proc_path = config.proc_path();
    println!("\n📁 Checking procfs root {}...", proc_path.display());
    match collect_proc_entries(&proc_path) {
        Ok(entries) if entries.is_empty() => {
            println!("   ❌ No process directories found");
            all_ok = false;
        }
        Ok(entries) => {
            println!("   ✅ Found {} process directories", entries.len());
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    // Run one full cycle
    if all_ok {
        println!("\n🧪 Running one collection cycle...");
        let collector = Collector::new(config.to_collector_options());
        match collector.snapshot() {
            Ok(snapshot) => {
                println!(
                    "   ✅ {} processes under {} names in {:.2}ms",
                    snapshot.table.instance_count(),
                    snapshot.table.name_count(),
                    snapshot.scan_duration.as_secs_f64() * 1000.0
                );
                for (state, count) in snapshot.counts.iter() {
                    println!("   ├─ {:<12} {}", state.name(), count);
                }
            }
            Err(e) => {
                println!("   ❌ Collection failed: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📊 {} metric templates available", metric_types().len());

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - collector is ready");
    } else {
        println!("   ❌ Some checks failed - please review the output above");
    }
    Ok(all_ok)
}
