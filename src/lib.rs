//! procfs processes collector library
//!
//! Scans every process under a procfs root into an immutable snapshot and
//! answers hierarchical, wildcard-capable metric queries against it:
//! per-process counters, per-name aggregates, instance counts and the
//! population by scheduling state.
//!
//! # Usage
//!
//! ```rust,no_run
//! use procfs_processes_collector::{Collector, CollectorOptions};
//!
//! let collector = Collector::new(CollectorOptions::default());
//! let metrics = collector
//!     .collect_paths(&["process/*/ps_count", "state/sleeping"])
//!     .expect("collection failed");
//!
//! for m in &metrics {
//!     println!("{} = {} {}", m.path, m.value, m.unit);
//! }
//! ```
//!
//! # Query grammar
//!
//! - `process/<name-or-*>/<pid-or-*-or-all>/<metric>`
//! - `process/<name-or-*>/ps_count`
//! - `state/<state-name>`

pub mod catalog;
pub mod collector;
pub mod error;
pub mod metric;
pub mod namespace;
pub mod process;

// Re-export main types for convenience
pub use catalog::{catalog, metric_types, MetricCategory, MetricDescriptor, MetricType};
pub use collector::{parse_patterns, CollectedMetric, Collector, CollectorOptions, Snapshot};
pub use error::{
    CollectError, NotFoundError, QueryError, ResolveError, ScanError, StateIntegrityError,
};
pub use metric::{CounterScale, MetricValue, ProcessMetric, LEGACY_COUNTER_SCALE};
pub use namespace::{resolve, MetricPath, QueryPattern, ResolvedMetric, Resolver, Segment};
pub use process::{
    scan, scan_with, ProcessInstance, ProcessState, ProcessTable, ScanOptions, StateCounts,
};
