//! Kernel scheduling-state classification.
//!
//! Maps the single-letter state code from field 3 of `/proc/<pid>/stat` to a
//! semantic name, and counts the population of a snapshot by state.

use serde::Serialize;
use std::fmt;

use crate::error::StateIntegrityError;
use crate::process::ProcessTable;

/// Semantic scheduling state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Sleeping,
    Waiting,
    Zombie,
    Stopped,
    Tracing,
    Dead,
    Wakekill,
    Waking,
    Parked,
    Idle,
}

/// Number of entries in the state table.
pub const STATE_COUNT: usize = 11;

/// Code → state table, in reporting order.
const STATE_TABLE: [(char, ProcessState); STATE_COUNT] = [
    ('R', ProcessState::Running),
    ('S', ProcessState::Sleeping),
    ('D', ProcessState::Waiting),
    ('Z', ProcessState::Zombie),
    ('T', ProcessState::Stopped),
    ('t', ProcessState::Tracing),
    ('X', ProcessState::Dead),
    ('K', ProcessState::Wakekill),
    ('W', ProcessState::Waking),
    ('P', ProcessState::Parked),
    ('I', ProcessState::Idle),
];

impl ProcessState {
    /// Every known state, in table order.
    pub const ALL: [ProcessState; STATE_COUNT] = [
        ProcessState::Running,
        ProcessState::Sleeping,
        ProcessState::Waiting,
        ProcessState::Zombie,
        ProcessState::Stopped,
        ProcessState::Tracing,
        ProcessState::Dead,
        ProcessState::Wakekill,
        ProcessState::Waking,
        ProcessState::Parked,
        ProcessState::Idle,
    ];

    /// Looks up a kernel state code. `None` for codes outside the table.
    pub fn from_code(code: char) -> Option<Self> {
        STATE_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, s)| *s)
    }

    /// Classifies the state code of `pid`, treating unknown codes as an
    /// integrity violation.
    pub fn classify(pid: u32, code: char) -> Result<Self, StateIntegrityError> {
        Self::from_code(code).ok_or(StateIntegrityError { pid, code })
    }

    /// Looks up a state by its semantic name (e.g. "sleeping").
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub fn code(self) -> char {
        STATE_TABLE
            .iter()
            .find(|(_, s)| *s == self)
            .map(|(c, _)| *c)
            .unwrap_or('?')
    }

    pub fn name(self) -> &'static str {
        match self {
            ProcessState::Running => "running",
            ProcessState::Sleeping => "sleeping",
            ProcessState::Waiting => "waiting",
            ProcessState::Zombie => "zombie",
            ProcessState::Stopped => "stopped",
            ProcessState::Tracing => "tracing",
            ProcessState::Dead => "dead",
            ProcessState::Wakekill => "wakekill",
            ProcessState::Waking => "waking",
            ProcessState::Parked => "parked",
            ProcessState::Idle => "idle",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of instances per scheduling state in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCounts {
    counts: [u64; STATE_COUNT],
}

impl Default for StateCounts {
    fn default() -> Self {
        Self {
            counts: [0; STATE_COUNT],
        }
    }
}

impl StateCounts {
    /// Counts every instance of `table` once. Fails on the first instance
    /// whose state code is not in the table.
    pub fn from_table(table: &ProcessTable) -> Result<Self, StateIntegrityError> {
        let mut counts = Self::default();
        for instance in table.instances() {
            let state = ProcessState::classify(instance.pid, instance.state)?;
            counts.increment(state);
        }
        Ok(counts)
    }

    pub fn increment(&mut self, state: ProcessState) {
        self.counts[state as usize] += 1;
    }

    pub fn get(&self, state: ProcessState) -> u64 {
        self.counts[state as usize]
    }

    /// Looks up the count for a semantic state name.
    pub fn by_name(&self, name: &str) -> Option<u64> {
        ProcessState::from_name(name).map(|s| self.get(s))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// All (state, count) pairs in table order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (ProcessState, u64)> + '_ {
        ProcessState::ALL.iter().map(move |s| (*s, self.get(*s)))
    }
}
