//! Per-process metric identities, values and the counter unit convention.

use serde::Serialize;
use std::fmt;

/// Scale factor some historical collectors applied to CPU-time and
/// page-fault counters. Only used with [`CounterScale::Legacy`].
pub const LEGACY_COUNTER_SCALE: u64 = 10_000;

/// Unit convention for CPU-time and page-fault counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CounterScale {
    /// Raw scheduler ticks and fault counts as the kernel reports them.
    #[default]
    Raw,
    /// Raw values multiplied by [`LEGACY_COUNTER_SCALE`].
    Legacy,
}

impl CounterScale {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            CounterScale::Legacy
        } else {
            CounterScale::Raw
        }
    }

    pub fn factor(self) -> u64 {
        match self {
            CounterScale::Raw => 1,
            CounterScale::Legacy => LEGACY_COUNTER_SCALE,
        }
    }

    pub fn apply(self, value: u64) -> u64 {
        value.saturating_mul(self.factor())
    }
}

/// A metric that can be read from a single process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessMetric {
    Vm,
    Rss,
    Data,
    Code,
    StackSize,
    CputimeUser,
    CputimeSystem,
    PagefaultsMin,
    PagefaultsMaj,
    DiskOpsSyscr,
    DiskOpsSyscw,
    DiskOctetsRchar,
    DiskOctetsWchar,
    CmdLine,
    Cmd,
}

impl ProcessMetric {
    pub const ALL: [ProcessMetric; 15] = [
        ProcessMetric::Vm,
        ProcessMetric::Rss,
        ProcessMetric::Data,
        ProcessMetric::Code,
        ProcessMetric::StackSize,
        ProcessMetric::CputimeUser,
        ProcessMetric::CputimeSystem,
        ProcessMetric::PagefaultsMin,
        ProcessMetric::PagefaultsMaj,
        ProcessMetric::DiskOpsSyscr,
        ProcessMetric::DiskOpsSyscw,
        ProcessMetric::DiskOctetsRchar,
        ProcessMetric::DiskOctetsWchar,
        ProcessMetric::CmdLine,
        ProcessMetric::Cmd,
    ];

    /// Name used as the last query segment.
    pub fn name(self) -> &'static str {
        match self {
            ProcessMetric::Vm => "ps_vm",
            ProcessMetric::Rss => "ps_rss",
            ProcessMetric::Data => "ps_data",
            ProcessMetric::Code => "ps_code",
            ProcessMetric::StackSize => "ps_stacksize",
            ProcessMetric::CputimeUser => "ps_cputime_user",
            ProcessMetric::CputimeSystem => "ps_cputime_system",
            ProcessMetric::PagefaultsMin => "ps_pagefaults_min",
            ProcessMetric::PagefaultsMaj => "ps_pagefaults_maj",
            ProcessMetric::DiskOpsSyscr => "ps_disk_ops_syscr",
            ProcessMetric::DiskOpsSyscw => "ps_disk_ops_syscw",
            ProcessMetric::DiskOctetsRchar => "ps_disk_octets_rchar",
            ProcessMetric::DiskOctetsWchar => "ps_disk_octets_wchar",
            ProcessMetric::CmdLine => "ps_cmd_line",
            ProcessMetric::Cmd => "ps_cmd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Whether values of this metric can be summed across instances.
    pub fn is_additive(self) -> bool {
        !matches!(self, ProcessMetric::CmdLine | ProcessMetric::Cmd)
    }

    /// Whether [`CounterScale`] applies to this metric.
    pub fn is_scaled_counter(self) -> bool {
        matches!(
            self,
            ProcessMetric::CputimeUser
                | ProcessMetric::CputimeSystem
                | ProcessMetric::PagefaultsMin
                | ProcessMetric::PagefaultsMaj
        )
    }
}

impl fmt::Display for ProcessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a resolved metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Counter(u64),
    Text(String),
}

impl MetricValue {
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Counter(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}
