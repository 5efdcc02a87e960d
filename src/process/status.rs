//! Parsing of `key: value` procfs files (`/proc/<pid>/io`, `/proc/<pid>/status`).

use ahash::AHashMap as HashMap;
use std::fs;
use std::path::Path;

/// Parses `key: value` lines into a map of unsigned counters.
///
/// Every line with at least two whitespace-separated tokens is considered; a
/// trailing colon is stripped from the key, and lines whose value does not
/// parse as `u64` are skipped. Trailing units such as `kB` are ignored.
pub fn parse_key_values(content: &str) -> HashMap<String, u64> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(key), Some(value)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let key = key.strip_suffix(':').unwrap_or(key);
        if let Ok(v) = value.parse::<u64>() {
            out.insert(key.to_string(), v);
        }
    }
    out
}

/// Reads `<proc_path>/io` into a counter map.
/// Note: other users' io files usually require root or CAP_SYS_PTRACE.
pub fn read_io_counters(proc_path: &Path) -> Result<HashMap<String, u64>, std::io::Error> {
    let content = fs::read(proc_path.join("io"))?;
    Ok(parse_key_values(&String::from_utf8_lossy(&content)))
}

/// Memory segment sizes taken from `/proc/<pid>/status`, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmSegments {
    pub data_bytes: u64,
    pub code_bytes: u64,
}

impl VmSegments {
    /// Derives segment sizes from status counters reported in kB.
    /// Missing keys count as zero.
    pub fn from_status(status: &HashMap<String, u64>) -> Self {
        let kb = |key: &str| status.get(key).copied().unwrap_or(0);
        Self {
            data_bytes: kb("VmData").saturating_mul(1024),
            code_bytes: kb("VmExe").saturating_add(kb("VmLib")).saturating_mul(1024),
        }
    }
}

/// Reads VmData and VmExe+VmLib from `<proc_path>/status`.
pub fn read_vm_segments(proc_path: &Path) -> Result<VmSegments, std::io::Error> {
    // The Name line carries the raw command name, which may not be UTF-8
    let content = fs::read(proc_path.join("status"))?;
    Ok(VmSegments::from_status(&parse_key_values(
        &String::from_utf8_lossy(&content),
    )))
}
