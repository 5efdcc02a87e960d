//! Metrics command implementation.
//!
//! Lists the query templates the collector answers.

use procfs_processes_collector::{metric_types, MetricCategory};

/// Lists metric templates, grouped by category.
pub fn command_metrics(verbose: bool) -> anyhow::Result<()> {
    println!("📊 procfs-collector - Metric Templates");
    println!("======================================");

    let types = metric_types();
    let sections = [
        (MetricCategory::PerInstance, "Per process instance"),
        (MetricCategory::PerNameAggregate, "Aggregated per process name"),
        (MetricCategory::InstanceCount, "Instance counts"),
        (MetricCategory::StateCount, "Processes per state"),
    ];

    for (category, title) in sections {
        let entries: Vec<_> = types
            .iter()
            .filter(|t| t.descriptor.category == category)
            .collect();

        println!("\n🔹 {} ({})", title, entries.len());
        for entry in entries {
            if verbose {
                let unit = if entry.descriptor.unit.is_empty() {
                    "-"
                } else {
                    entry.descriptor.unit
                };
                println!("   ├─ {}", entry.template);
                println!("   │  ├─ Unit: {}", unit);
                println!("   │  └─ {}", entry.descriptor.description);
            } else {
                println!("   {}", entry.template);
            }
        }
    }

    println!("\n📋 {} templates in total", types.len());
    Ok(())
}
