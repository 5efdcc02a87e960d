//! Process scanning: turns a procfs root into a [`ProcessTable`] snapshot.
//!
//! Each numeric directory under the root is one process. Its `stat`,
//! `cmdline`, `io` and (for non-zombies) `status` files are read as a unit;
//! a failure on any of them drops only that pid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::process::instance::{ProcessInstance, ProcessTable};
use crate::process::stat::{StatLine, StatParseError, StatReadError};
use crate::process::status::{read_io_counters, read_vm_segments, VmSegments};

/// Default procfs mount point.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Process entry representing a pid directory under the procfs root.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Options for a single scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Keep kernel threads (processes without a command line).
    pub include_system_processes: bool,
    /// Abandon the remaining pids once this instant has passed.
    pub deadline: Option<Instant>,
}

impl ScanOptions {
    /// Options that keep every readable process and never stop early.
    pub fn all() -> Self {
        Self {
            include_system_processes: true,
            deadline: None,
        }
    }
}

/// Why a single pid was left out of the snapshot.
#[derive(Debug, thiserror::Error)]
enum PidError {
    #[error("cannot read {file}: {source}")]
    Read {
        file: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed stat: {0}")]
    Malformed(#[from] StatParseError),
    #[error("cannot derive a process name")]
    NoName,
}

impl From<StatReadError> for PidError {
    fn from(e: StatReadError) -> Self {
        match e {
            StatReadError::Io(source) => PidError::Read {
                file: "stat",
                source,
            },
            StatReadError::Malformed(e) => PidError::Malformed(e),
        }
    }
}

/// Lists pid directories under `root`, sorted by pid.
pub fn collect_proc_entries(root: &Path) -> Result<Vec<ProcEntry>, ScanError> {
    let entries = fs::read_dir(root).map_err(|source| ScanError {
        root: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
    }
    out.sort_by_key(|e| e.pid);
    Ok(out)
}

/// Replaces the characters that are unsafe in a query path segment.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '\\'))
        .map(|c| if c == '/' { '.' } else { c })
        .collect()
}

/// Derives the process name: base name of the first command-line token,
/// falling back to the sanitized stat command field for kernel threads.
/// A first token without a final component (`/`, `..`) also falls back.
pub fn derive_process_name(cmdline: &str, stat: &StatLine) -> Option<String> {
    let from_cmdline = cmdline
        .split_whitespace()
        .next()
        .and_then(|first| Path::new(first).file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let name = match from_cmdline {
        Some(n) => n,
        None => sanitize_name(stat.comm()),
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Reads `<proc_path>/cmdline`, replacing NUL separators by spaces.
pub fn read_cmdline(proc_path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read(proc_path.join("cmdline"))?;
    Ok(String::from_utf8_lossy(&content).replace('\0', " "))
}

/// Reads the four per-process sources for one pid.
fn read_process(entry: &ProcEntry) -> Result<(String, ProcessInstance), PidError> {
    let path = &entry.proc_path;

    let stat = StatLine::read(path)?;
    let cmdline = read_cmdline(path).map_err(|source| PidError::Read {
        file: "cmdline",
        source,
    })?;
    let io = read_io_counters(path).map_err(|source| PidError::Read { file: "io", source })?;

    let mut instance = ProcessInstance {
        pid: entry.pid,
        state: stat.state,
        cmdline,
        stat,
        io,
        vm_data_bytes: 0,
        vm_code_bytes: 0,
    };

    // Zombies have no memory maps; their status block is not consulted.
    let segments = if instance.is_zombie() {
        VmSegments::default()
    } else {
        read_vm_segments(path).map_err(|source| PidError::Read {
            file: "status",
            source,
        })?
    };
    instance.vm_data_bytes = segments.data_bytes;
    instance.vm_code_bytes = segments.code_bytes;

    let name = derive_process_name(&instance.cmdline, &instance.stat).ok_or(PidError::NoName)?;
    Ok((name, instance))
}

/// Scans `root` keeping every readable process.
pub fn scan(root: &Path) -> Result<ProcessTable, ScanError> {
    scan_with(root, &ScanOptions::all())
}

/// Scans `root` into a snapshot. Fails only if `root` cannot be listed.
pub fn scan_with(root: &Path, options: &ScanOptions) -> Result<ProcessTable, ScanError> {
    let entries = collect_proc_entries(root)?;
    let mut table = ProcessTable::new();
    let mut skipped = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        if let Some(deadline) = options.deadline {
            if Instant::now() >= deadline {
                warn!(
                    "Scan deadline reached, abandoning {} of {} pids",
                    entries.len() - idx,
                    entries.len()
                );
                break;
            }
        }

        match read_process(entry) {
            Ok((name, instance)) => {
                if !options.include_system_processes && instance.is_system_process() {
                    continue;
                }
                table.insert(name, instance);
            }
            Err(e @ PidError::Read { .. }) => {
                skipped += 1;
                debug!("Skipping pid {}: {}", entry.pid, e);
            }
            Err(e) => {
                skipped += 1;
                warn!("Skipping pid {}: {}", entry.pid, e);
            }
        }
    }

    debug!(
        "Scanned {}: {} processes under {} names, {} skipped",
        root.display(),
        table.instance_count(),
        table.name_count(),
        skipped
    );
    Ok(table)
}
