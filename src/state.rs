//! Application state management for the collector server.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use procfs_processes_collector::{CollectError, CollectedMetric, Collector, QueryPattern};
use prometheus::{Gauge, IntCounter, Registry};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub scan_duration: Gauge,
    pub processes: Gauge,
    pub cycles_total: IntCounter,
    pub cycle_errors_total: IntCounter,
    pub collector: Collector,
    /// Serializes collection cycles; each request scans procfs afresh.
    pub cycle_lock: Arc<Mutex<()>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Builds the state and registers the collector's own telemetry.
    pub fn new(config: Config) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scan_duration = Gauge::new(
            "procfs_collector_scan_duration_seconds",
            "Time spent scanning procfs in the last collection cycle",
        )?;
        let processes = Gauge::new(
            "procfs_collector_processes",
            "Number of processes in the last collection cycle",
        )?;
        let cycles_total = IntCounter::new(
            "procfs_collector_cycles_total",
            "Number of collection cycles run",
        )?;
        let cycle_errors_total = IntCounter::new(
            "procfs_collector_cycle_errors_total",
            "Number of collection cycles that failed",
        )?;

        registry.register(Box::new(scan_duration.clone()))?;
        registry.register(Box::new(processes.clone()))?;
        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(cycle_errors_total.clone()))?;
        debug!("All metrics registered successfully");

        Ok(Self {
            registry,
            scan_duration,
            processes,
            cycles_total,
            cycle_errors_total,
            collector: Collector::new(config.to_collector_options()),
            cycle_lock: Arc::new(Mutex::new(())),
            start_time: Instant::now(),
        })
    }

    /// Runs one blocking collection cycle and records its telemetry.
    pub fn run_cycle(
        &self,
        patterns: &[QueryPattern],
    ) -> Result<Vec<CollectedMetric>, CollectError> {
        self.cycles_total.inc();

        let result = self.collector.snapshot().and_then(|snapshot| {
            self.scan_duration
                .set(snapshot.scan_duration.as_secs_f64());
            self.processes.set(snapshot.table.instance_count() as f64);
            snapshot.resolve_all(patterns, self.collector.options().scale)
        });

        if result.is_err() {
            self.cycle_errors_total.inc();
        }
        result
    }
}

/// Runs `f` on the blocking pool while holding `lock`.
/// The guard lives until `f` returns, even if the returned handle is dropped.
pub async fn spawn_serialized<F, T>(lock: Arc<Mutex<()>>, f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = lock.lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        f()
    })
}
