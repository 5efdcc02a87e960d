//! Static registry of every metric the collector can answer.
//!
//! Units and descriptions are response metadata only; nothing here takes
//! part in computing values.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::metric::ProcessMetric;
use crate::process::ProcessState;

/// Name of the per-process-name instance-count metric.
pub const COUNT_METRIC: &str = "ps_count";

/// Reserved pid segment meaning "sum across instances".
pub const AGGREGATE_TOKEN: &str = "all";

/// Dynamic segment matching any value.
pub const WILDCARD_TOKEN: &str = "*";

/// Leading segment of process queries.
pub const PROCESS_CATEGORY: &str = "process";

/// Leading segment of state queries.
pub const STATE_CATEGORY: &str = "state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricCategory {
    PerInstance,
    PerNameAggregate,
    InstanceCount,
    StateCount,
}

/// Registry entry for one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub unit: &'static str,
    pub description: String,
    pub category: MetricCategory,
}

/// A query template the collector answers, with its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MetricType {
    pub template: String,
    #[serde(flatten)]
    pub descriptor: &'static MetricDescriptor,
}

pub struct MetricCatalog {
    instance: Vec<MetricDescriptor>,
    aggregate: Vec<(ProcessMetric, MetricDescriptor)>,
    count: MetricDescriptor,
    states: Vec<MetricDescriptor>,
}

fn unit_of(metric: ProcessMetric) -> &'static str {
    match metric {
        ProcessMetric::Vm
        | ProcessMetric::Data
        | ProcessMetric::Code
        | ProcessMetric::StackSize
        | ProcessMetric::DiskOctetsRchar
        | ProcessMetric::DiskOctetsWchar => "B",
        ProcessMetric::CputimeUser | ProcessMetric::CputimeSystem => "Jiff",
        ProcessMetric::Rss
        | ProcessMetric::PagefaultsMin
        | ProcessMetric::PagefaultsMaj
        | ProcessMetric::DiskOpsSyscr
        | ProcessMetric::DiskOpsSyscw
        | ProcessMetric::CmdLine
        | ProcessMetric::Cmd => "",
    }
}

fn description_of(metric: ProcessMetric) -> &'static str {
    match metric {
        ProcessMetric::Vm => "Virtual memory size in bytes",
        ProcessMetric::Rss => {
            "Resident Set Size: number of pages the process has in real memory"
        }
        ProcessMetric::Data => "Size of data segments",
        ProcessMetric::Code => "Size of text segment",
        ProcessMetric::StackSize => "Stack size",
        ProcessMetric::CputimeUser => {
            "Amount of time that this process has been scheduled in user mode"
        }
        ProcessMetric::CputimeSystem => {
            "Amount of time that this process has been scheduled in kernel mode"
        }
        ProcessMetric::PagefaultsMin => "The number of minor faults the process has made",
        ProcessMetric::PagefaultsMaj => "The number of major faults the process has made",
        ProcessMetric::DiskOpsSyscr => "Attempt to count the number of read I/O operations",
        ProcessMetric::DiskOpsSyscw => "Attempt to count the number of write I/O operations",
        ProcessMetric::DiskOctetsRchar => {
            "The number of bytes which this task has caused to be read from storage"
        }
        ProcessMetric::DiskOctetsWchar => {
            "The number of bytes which this task has caused, or shall cause to be written to disk"
        }
        ProcessMetric::CmdLine => "Process command line with full path and args",
        ProcessMetric::Cmd => "Process command line with full path",
    }
}

impl MetricCatalog {
    fn build() -> Self {
        let instance = ProcessMetric::ALL
            .iter()
            .map(|m| MetricDescriptor {
                name: m.name().to_string(),
                unit: unit_of(*m),
                description: description_of(*m).to_string(),
                category: MetricCategory::PerInstance,
            })
            .collect();

        let aggregate = ProcessMetric::ALL
            .iter()
            .filter(|m| m.is_additive())
            .map(|m| {
                (
                    *m,
                    MetricDescriptor {
                        name: m.name().to_string(),
                        unit: unit_of(*m),
                        description: format!(
                            "{} (sum over all instances of the process name)",
                            description_of(*m)
                        ),
                        category: MetricCategory::PerNameAggregate,
                    },
                )
            })
            .collect();

        let states = ProcessState::ALL
            .iter()
            .map(|s| MetricDescriptor {
                name: s.name().to_string(),
                unit: "",
                description: format!("Number of processes in {} state", s),
                category: MetricCategory::StateCount,
            })
            .collect();

        Self {
            instance,
            aggregate,
            count: MetricDescriptor {
                name: COUNT_METRIC.to_string(),
                unit: "",
                description: "Number of running instances of the process name".to_string(),
                category: MetricCategory::InstanceCount,
            },
            states,
        }
    }

    /// Descriptor of a per-instance metric.
    pub fn instance(&self, metric: ProcessMetric) -> &MetricDescriptor {
        &self.instance[metric as usize]
    }

    /// Descriptor of the per-name aggregate of `metric`, if it is additive.
    pub fn aggregate(&self, metric: ProcessMetric) -> Option<&MetricDescriptor> {
        self.aggregate
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, d)| d)
    }

    pub fn count(&self) -> &MetricDescriptor {
        &self.count
    }

    pub fn state(&self, state: ProcessState) -> &MetricDescriptor {
        &self.states[state as usize]
    }

    /// Every registry entry, grouped by category.
    pub fn descriptors(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.instance
            .iter()
            .chain(self.aggregate.iter().map(|(_, d)| d))
            .chain(std::iter::once(&self.count))
            .chain(self.states.iter())
    }
}

static CATALOG: Lazy<MetricCatalog> = Lazy::new(MetricCatalog::build);

/// The process-wide metric catalog.
pub fn catalog() -> &'static MetricCatalog {
    &CATALOG
}

/// Lists the query templates the collector answers, one per catalog entry.
pub fn metric_types() -> Vec<MetricType> {
    let cat = catalog();
    let mut out = Vec::new();

    for metric in ProcessMetric::ALL {
        out.push(MetricType {
            template: format!(
                "{}/{}/{}/{}",
                PROCESS_CATEGORY, WILDCARD_TOKEN, WILDCARD_TOKEN, metric
            ),
            descriptor: cat.instance(metric),
        });
    }
    for metric in ProcessMetric::ALL {
        if let Some(descriptor) = cat.aggregate(metric) {
            out.push(MetricType {
                template: format!(
                    "{}/{}/{}/{}",
                    PROCESS_CATEGORY, WILDCARD_TOKEN, AGGREGATE_TOKEN, metric
                ),
                descriptor,
            });
        }
    }
    out.push(MetricType {
        template: format!("{}/{}/{}", PROCESS_CATEGORY, WILDCARD_TOKEN, COUNT_METRIC),
        descriptor: cat.count(),
    });
    for state in ProcessState::ALL {
        out.push(MetricType {
            template: format!("{}/{}", STATE_CATEGORY, state),
            descriptor: cat.state(state),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_descriptors_match_metric_order() {
        let cat = catalog();
        for metric in ProcessMetric::ALL {
            let d = cat.instance(metric);
            assert_eq!(d.name, metric.name());
            assert_eq!(d.category, MetricCategory::PerInstance);
        }
    }

    #[test]
    fn test_units() {
        let cat = catalog();
        assert_eq!(cat.instance(ProcessMetric::Vm).unit, "B");
        assert_eq!(cat.instance(ProcessMetric::Rss).unit, "");
        assert_eq!(cat.instance(ProcessMetric::CputimeUser).unit, "Jiff");
        assert_eq!(cat.instance(ProcessMetric::DiskOctetsWchar).unit, "B");
        assert_eq!(cat.instance(ProcessMetric::DiskOpsSyscr).unit, "");
    }

    #[test]
    fn test_aggregates_exclude_text_metrics() {
        let cat = catalog();
        assert!(cat.aggregate(ProcessMetric::CmdLine).is_none());
        assert!(cat.aggregate(ProcessMetric::Cmd).is_none());

        let vm = cat.aggregate(ProcessMetric::Vm).expect("ps_vm is additive");
        assert_eq!(vm.category, MetricCategory::PerNameAggregate);
        assert_eq!(vm.unit, "B");
    }

    #[test]
    fn test_state_descriptors() {
        let cat = catalog();
        let d = cat.state(ProcessState::Sleeping);
        assert_eq!(d.name, "sleeping");
        assert_eq!(d.description, "Number of processes in sleeping state");
        assert_eq!(d.category, MetricCategory::StateCount);
    }

    #[test]
    fn test_metric_types_cover_catalog() {
        let types = metric_types();
        // 15 per-instance + 13 aggregates + ps_count + 11 states
        assert_eq!(types.len(), 15 + 13 + 1 + 11);
        assert_eq!(types.len(), catalog().descriptors().count());

        let templates: Vec<&str> = types.iter().map(|t| t.template.as_str()).collect();
        assert!(templates.contains(&"process/*/*/ps_vm"));
        assert!(templates.contains(&"process/*/all/ps_disk_ops_syscr"));
        assert!(templates.contains(&"process/*/ps_count"));
        assert!(templates.contains(&"state/zombie"));
        assert!(!templates.contains(&"process/*/all/ps_cmd_line"));
    }
}
