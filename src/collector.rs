//! One collection cycle: scan, count states, resolve the requested patterns.
//!
//! Nothing is retained between cycles. Each call to [`Collector::snapshot`]
//! or [`Collector::collect`] scans procfs afresh.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::error::{CollectError, QueryError};
use crate::metric::{CounterScale, MetricValue};
use crate::namespace::{MetricPath, QueryPattern, Resolver};
use crate::process::{scan_with, ProcessTable, ScanOptions, StateCounts, DEFAULT_PROC_PATH};

/// Settings supplied by the host for every cycle.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub proc_path: PathBuf,
    pub include_system_processes: bool,
    pub scale: CounterScale,
    /// Stop reading further pids once a scan has run this long.
    pub scan_timeout: Option<Duration>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
            include_system_processes: false,
            scale: CounterScale::Raw,
            scan_timeout: None,
        }
    }
}

/// A resolved metric with its metadata and collection timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedMetric {
    pub path: MetricPath,
    pub value: MetricValue,
    pub unit: &'static str,
    pub description: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// The immutable state of one cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: ProcessTable,
    pub counts: StateCounts,
    pub timestamp: DateTime<Utc>,
    pub scan_duration: Duration,
}

impl Snapshot {
    /// Builds a snapshot from an already scanned table.
    pub fn from_table(table: ProcessTable, timestamp: DateTime<Utc>) -> Result<Self, CollectError> {
        let counts = StateCounts::from_table(&table)?;
        Ok(Self {
            table,
            counts,
            timestamp,
            scan_duration: Duration::ZERO,
        })
    }

    /// Resolves every pattern in order. The first failing pattern aborts the
    /// whole batch.
    pub fn resolve_all(
        &self,
        patterns: &[QueryPattern],
        scale: CounterScale,
    ) -> Result<Vec<CollectedMetric>, CollectError> {
        let resolver = Resolver::new(&self.table, &self.counts, scale);
        let mut out = Vec::new();

        for pattern in patterns {
            let resolved = resolver.resolve(pattern)?;
            debug!("Resolved {} into {} metrics", pattern, resolved.len());
            out.extend(resolved.into_iter().map(|r| CollectedMetric {
                path: r.path,
                value: r.value,
                unit: r.descriptor.unit,
                description: r.descriptor.description.as_str(),
                timestamp: self.timestamp,
            }));
        }
        Ok(out)
    }
}

/// Parses a batch of query paths, failing on the first malformed one.
pub fn parse_patterns<S: AsRef<str>>(paths: &[S]) -> Result<Vec<QueryPattern>, QueryError> {
    paths.iter().map(|p| QueryPattern::parse(p.as_ref())).collect()
}

/// Runs collection cycles with fixed host settings.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    options: CollectorOptions,
}

impl Collector {
    pub fn new(options: CollectorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CollectorOptions {
        &self.options
    }

    /// Scans procfs and counts states.
    #[instrument(skip(self), fields(proc_path = %self.options.proc_path.display()))]
    pub fn snapshot(&self) -> Result<Snapshot, CollectError> {
        let timestamp = Utc::now();
        let start = Instant::now();
        let scan_options = ScanOptions {
            include_system_processes: self.options.include_system_processes,
            deadline: self.options.scan_timeout.map(|t| start + t),
        };

        let table = scan_with(&self.options.proc_path, &scan_options)?;
        let mut snapshot = Snapshot::from_table(table, timestamp)?;
        snapshot.scan_duration = start.elapsed();

        info!(
            "Scanned {} processes under {} names in {:.2}ms",
            snapshot.table.instance_count(),
            snapshot.table.name_count(),
            snapshot.scan_duration.as_secs_f64() * 1000.0
        );
        Ok(snapshot)
    }

    /// Runs one cycle for already parsed patterns.
    pub fn collect(&self, patterns: &[QueryPattern]) -> Result<Vec<CollectedMetric>, CollectError> {
        let snapshot = self.snapshot()?;
        snapshot.resolve_all(patterns, self.options.scale)
    }

    /// Runs one cycle for raw query paths. Malformed paths abort the batch
    /// before procfs is touched.
    pub fn collect_paths<S: AsRef<str>>(
        &self,
        paths: &[S],
    ) -> Result<Vec<CollectedMetric>, CollectError> {
        let patterns = parse_patterns(paths)?;
        self.collect(&patterns)
    }
}
