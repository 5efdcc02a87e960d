//! Snapshot types produced by one procfs scan.

use ahash::AHashMap as HashMap;
use std::collections::BTreeMap;

use crate::metric::{CounterScale, MetricValue, ProcessMetric};
use crate::process::stat::StatLine;

/// Kernel state code of a zombie process.
pub const ZOMBIE_CODE: char = 'Z';

/// One process observed at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInstance {
    pub pid: u32,
    /// Raw kernel state code (field 3 of the stat line).
    pub state: char,
    /// Command line with NUL separators replaced by spaces.
    pub cmdline: String,
    pub stat: StatLine,
    pub io: HashMap<String, u64>,
    pub vm_data_bytes: u64,
    pub vm_code_bytes: u64,
}

impl ProcessInstance {
    pub fn is_zombie(&self) -> bool {
        self.state == ZOMBIE_CODE
    }

    /// Kernel threads carry no command line.
    pub fn is_system_process(&self) -> bool {
        self.cmdline.trim().is_empty()
    }

    fn io_counter(&self, key: &str) -> u64 {
        self.io.get(key).copied().unwrap_or(0)
    }

    /// Executable path: the first word of the command line.
    pub fn cmd(&self) -> &str {
        self.cmdline.split_whitespace().next().unwrap_or("")
    }

    /// Numeric value of an additive metric; `None` for text metrics.
    pub fn counter(&self, metric: ProcessMetric, scale: CounterScale) -> Option<u64> {
        let raw = match metric {
            ProcessMetric::Vm => self.stat.vsize,
            ProcessMetric::Rss => self.stat.rss,
            ProcessMetric::Data => self.vm_data_bytes,
            ProcessMetric::Code => self.vm_code_bytes,
            ProcessMetric::StackSize => self.stat.stack_size(),
            ProcessMetric::CputimeUser => self.stat.utime,
            ProcessMetric::CputimeSystem => self.stat.stime,
            ProcessMetric::PagefaultsMin => self.stat.minflt,
            ProcessMetric::PagefaultsMaj => self.stat.majflt,
            ProcessMetric::DiskOpsSyscr => self.io_counter("syscr"),
            ProcessMetric::DiskOpsSyscw => self.io_counter("syscw"),
            ProcessMetric::DiskOctetsRchar => self.io_counter("rchar"),
            ProcessMetric::DiskOctetsWchar => self.io_counter("wchar"),
            ProcessMetric::CmdLine | ProcessMetric::Cmd => return None,
        };

        if metric.is_scaled_counter() {
            Some(scale.apply(raw))
        } else {
            Some(raw)
        }
    }

    pub fn metric(&self, metric: ProcessMetric, scale: CounterScale) -> MetricValue {
        match metric {
            ProcessMetric::CmdLine => MetricValue::Text(self.cmdline.clone()),
            ProcessMetric::Cmd => MetricValue::Text(self.cmd().to_string()),
            _ => MetricValue::Counter(self.counter(metric, scale).unwrap_or(0)),
        }
    }
}

/// Instances of one process name, keyed by pid.
pub type InstanceMap = BTreeMap<u32, ProcessInstance>;

/// Snapshot of all processes, grouped by derived process name.
///
/// Both levels are ordered maps, so every traversal yields names in sorted
/// order and pids ascending within a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTable {
    by_name: BTreeMap<String, InstanceMap>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance under `name`. Returns the instance previously stored
    /// for the same name and pid, if any.
    pub fn insert(&mut self, name: String, instance: ProcessInstance) -> Option<ProcessInstance> {
        self.by_name
            .entry(name)
            .or_default()
            .insert(instance.pid, instance)
    }

    pub fn get(&self, name: &str) -> Option<&InstanceMap> {
        self.by_name.get(name)
    }

    pub fn instance(&self, name: &str, pid: u32) -> Option<&ProcessInstance> {
        self.by_name.get(name)?.get(&pid)
    }

    /// Finds a pid under any name.
    pub fn find_pid(&self, pid: u32) -> Option<(&str, &ProcessInstance)> {
        self.by_name
            .iter()
            .find_map(|(name, instances)| instances.get(&pid).map(|i| (name.as_str(), i)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstanceMap)> {
        self.by_name.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn instances(&self) -> impl Iterator<Item = &ProcessInstance> {
        self.by_name.values().flat_map(|m| m.values())
    }

    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn instance_count(&self) -> usize {
        self.by_name.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
