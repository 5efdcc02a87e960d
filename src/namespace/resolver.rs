//! Resolution of query patterns against one snapshot.

use serde::Serialize;
use std::fmt;

use crate::catalog::{
    catalog, MetricDescriptor, AGGREGATE_TOKEN, COUNT_METRIC, PROCESS_CATEGORY, STATE_CATEGORY,
};
use crate::error::{NotFoundError, QueryError, ResolveError};
use crate::metric::{CounterScale, MetricValue, ProcessMetric};
use crate::namespace::query::{QueryPattern, Segment};
use crate::process::{InstanceMap, ProcessInstance, ProcessState, ProcessTable, StateCounts};

/// Concrete path of a resolved metric, every dynamic segment substituted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct MetricPath(Vec<String>);

impl MetricPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for MetricPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<MetricPath> for String {
    fn from(p: MetricPath) -> Self {
        p.to_string()
    }
}

/// One concrete (path, value) answer with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetric {
    pub path: MetricPath,
    pub value: MetricValue,
    pub descriptor: &'static MetricDescriptor,
}

fn instance_path(name: &str, pid: u32, metric: ProcessMetric) -> MetricPath {
    MetricPath(vec![
        PROCESS_CATEGORY.to_string(),
        name.to_string(),
        pid.to_string(),
        metric.name().to_string(),
    ])
}

fn aggregate_path(name: &str, metric: ProcessMetric) -> MetricPath {
    MetricPath(vec![
        PROCESS_CATEGORY.to_string(),
        name.to_string(),
        AGGREGATE_TOKEN.to_string(),
        metric.name().to_string(),
    ])
}

fn count_path(name: &str) -> MetricPath {
    MetricPath(vec![
        PROCESS_CATEGORY.to_string(),
        name.to_string(),
        COUNT_METRIC.to_string(),
    ])
}

fn state_path(state: ProcessState) -> MetricPath {
    MetricPath(vec![STATE_CATEGORY.to_string(), state.name().to_string()])
}

/// Names selected by a name segment, in sorted order. An exact name that is
/// not in the table selects nothing.
fn matching_names<'a>(
    table: &'a ProcessTable,
    name: &'a Segment<String>,
) -> Box<dyn Iterator<Item = (&'a str, &'a InstanceMap)> + 'a> {
    match name {
        Segment::Exact(n) => Box::new(table.get(n).map(|m| (n.as_str(), m)).into_iter()),
        // the aggregate token is never produced for names
        Segment::Wildcard | Segment::Aggregate => Box::new(table.iter()),
    }
}

/// Resolves queries against a single snapshot and its state counts.
pub struct Resolver<'a> {
    table: &'a ProcessTable,
    counts: &'a StateCounts,
    scale: CounterScale,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a ProcessTable, counts: &'a StateCounts, scale: CounterScale) -> Self {
        Self {
            table,
            counts,
            scale,
        }
    }

    /// Resolves one pattern. Results are ordered by process name, then pid.
    pub fn resolve(&self, pattern: &QueryPattern) -> Result<Vec<ResolvedMetric>, ResolveError> {
        match pattern {
            QueryPattern::State(state) => Ok(self.resolve_state(state)),
            QueryPattern::InstanceCount { name } => Ok(self.resolve_count(name)),
            QueryPattern::ProcessMetric { name, pid, metric } => {
                self.resolve_process_metric(name, pid, *metric)
            }
        }
    }

    fn resolve_state(&self, state: &Segment<String>) -> Vec<ResolvedMetric> {
        let cat = catalog();
        let states: Vec<ProcessState> = match state {
            Segment::Exact(name) => ProcessState::from_name(name).into_iter().collect(),
            Segment::Wildcard | Segment::Aggregate => ProcessState::ALL.to_vec(),
        };

        states
            .into_iter()
            .map(|s| ResolvedMetric {
                path: state_path(s),
                value: MetricValue::Counter(self.counts.get(s)),
                descriptor: cat.state(s),
            })
            .collect()
    }

    fn resolve_count(&self, name: &Segment<String>) -> Vec<ResolvedMetric> {
        let descriptor = catalog().count();
        matching_names(self.table, name)
            .map(|(n, instances)| ResolvedMetric {
                path: count_path(n),
                value: MetricValue::Counter(instances.len() as u64),
                descriptor,
            })
            .collect()
    }

    fn resolve_process_metric(
        &self,
        name: &Segment<String>,
        pid: &Segment<u32>,
        metric: ProcessMetric,
    ) -> Result<Vec<ResolvedMetric>, ResolveError> {
        match (name, pid) {
            (Segment::Exact(n), Segment::Exact(p)) => {
                let instance = self.table.instance(n, *p).ok_or_else(|| NotFoundError {
                    name: n.clone(),
                    pid: *p,
                })?;
                Ok(vec![self.instance_metric(n, instance, metric)])
            }
            (_, Segment::Exact(p)) => Ok(self
                .table
                .find_pid(*p)
                .map(|(n, instance)| self.instance_metric(n, instance, metric))
                .into_iter()
                .collect()),
            (_, Segment::Wildcard) => Ok(matching_names(self.table, name)
                .flat_map(|(n, instances)| {
                    instances
                        .values()
                        .map(move |instance| self.instance_metric(n, instance, metric))
                })
                .collect()),
            (_, Segment::Aggregate) => {
                let descriptor = catalog()
                    .aggregate(metric)
                    .ok_or_else(|| QueryError::NotAggregatable(metric.name().to_string()))?;
                Ok(matching_names(self.table, name)
                    .map(|(n, instances)| ResolvedMetric {
                        path: aggregate_path(n, metric),
                        value: MetricValue::Counter(self.sum(instances, metric)),
                        descriptor,
                    })
                    .collect())
            }
        }
    }

    fn instance_metric(
        &self,
        name: &str,
        instance: &ProcessInstance,
        metric: ProcessMetric,
    ) -> ResolvedMetric {
        ResolvedMetric {
            path: instance_path(name, instance.pid, metric),
            value: instance.metric(metric, self.scale),
            descriptor: catalog().instance(metric),
        }
    }

    fn sum(&self, instances: &InstanceMap, metric: ProcessMetric) -> u64 {
        instances
            .values()
            .filter_map(|i| i.counter(metric, self.scale))
            .fold(0u64, u64::saturating_add)
    }
}

/// Resolves `pattern` against `table` and `counts`.
pub fn resolve(
    pattern: &QueryPattern,
    table: &ProcessTable,
    counts: &StateCounts,
    scale: CounterScale,
) -> Result<Vec<ResolvedMetric>, ResolveError> {
    Resolver::new(table, counts, scale).resolve(pattern)
}
