//! Error types for scanning, classification and query resolution.
//!
//! Per-pid read failures never show up here: they are logged and the pid is
//! dropped from the snapshot. Everything in this module is surfaced to the
//! caller of a collection cycle.

use std::path::PathBuf;

/// The procfs root itself could not be listed.
#[derive(Debug, thiserror::Error)]
#[error("cannot list procfs root {}: {source}", .root.display())]
pub struct ScanError {
    pub root: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A process reported a scheduling-state code outside the known table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized kernel state code '{code}' for pid {pid}")]
pub struct StateIntegrityError {
    pub pid: u32,
    pub code: char,
}

/// A query pattern that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("empty query pattern")]
    Empty,

    #[error("unknown category '{0}', expected 'process' or 'state'")]
    UnknownCategory(String),

    #[error("unknown namespace length for '{category}': expected {expected}, is {actual}")]
    SegmentCount {
        category: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("empty segment at position {0}")]
    EmptySegment(usize),

    #[error("expected 'ps_count' as last segment, found '{0}'")]
    ExpectedCount(String),

    #[error("invalid pid segment '{0}'")]
    InvalidPid(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("metric '{0}' is not additive and cannot be aggregated")]
    NotAggregatable(String),
}

/// A fully concrete process name and pid that is not in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no process '{name}' with pid {pid}")]
pub struct NotFoundError {
    pub name: String,
    pub pid: u32,
}

/// Failure while resolving a single pattern against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Failure of a whole collection cycle.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    State(#[from] StateIntegrityError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl From<ResolveError> for CollectError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Query(q) => CollectError::Query(q),
            ResolveError::NotFound(n) => CollectError::NotFound(n),
        }
    }
}
