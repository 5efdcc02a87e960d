//! Process-related modules for procfs scanning and state classification.
//!
//! This module provides:
//! - `stat`: Parsing of the positional `/proc/<pid>/stat` line
//! - `status`: Parsing of `key: value` files (`io`, `status`)
//! - `scanner`: Process discovery and snapshot assembly
//! - `instance`: Snapshot types (`ProcessInstance`, `ProcessTable`)
//! - `state`: Scheduling-state classification and counts

pub mod instance;
pub mod scanner;
pub mod stat;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use instance::{InstanceMap, ProcessInstance, ProcessTable, ZOMBIE_CODE};
pub use scanner::{
    collect_proc_entries, derive_process_name, scan, scan_with, ProcEntry, ScanOptions,
    DEFAULT_PROC_PATH,
};
pub use stat::{StatLine, StatParseError, StatReadError, MIN_STAT_FIELDS};
pub use state::{ProcessState, StateCounts};
pub use status::{parse_key_values, VmSegments};
