//! Integration tests for the collector.
//!
//! These tests build a fake procfs tree in a temporary directory and run full
//! collection cycles against it through the public library API.

use procfs_processes_collector::{
    metric_types, scan, CollectError, CollectedMetric, Collector, CollectorOptions, CounterScale,
    MetricValue, ProcessState, StateCounts, LEGACY_COUNTER_SCALE,
};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Builder for one fake `/proc/<pid>` directory.
struct FakeProcess {
    pid: u32,
    comm: &'static str,
    state: char,
    cmdline: String,
    /// (1-indexed stat field, value) overrides
    stat: Vec<(usize, u64)>,
    io: &'static str,
    status: &'static str,
}

impl FakeProcess {
    fn new(pid: u32, comm: &'static str, state: char) -> Self {
        Self {
            pid,
            comm,
            state,
            cmdline: format!("/usr/bin/{}\0--serve\0", comm),
            stat: Vec::new(),
            io: "rchar: 100\nwchar: 200\nsyscr: 10\nsyscw: 20\nread_bytes: 0\n",
            status: "Name:\tfake\nVmData:\t 4 kB\nVmExe:\t 1 kB\nVmLib:\t 2 kB\n",
        }
    }

    fn cmdline(mut self, cmdline: &str) -> Self {
        self.cmdline = cmdline.to_string();
        self
    }

    fn stat(mut self, field: usize, value: u64) -> Self {
        self.stat.push((field, value));
        self
    }

    fn io(mut self, io: &'static str) -> Self {
        self.io = io;
        self
    }

    fn status(mut self, status: &'static str) -> Self {
        self.status = status;
        self
    }

    fn write(&self, root: &Path) {
        let dir = root.join(self.pid.to_string());
        fs::create_dir_all(&dir).unwrap();

        let mut fields = vec![
            self.pid.to_string(),
            format!("({})", self.comm),
            self.state.to_string(),
        ];
        for field in 4..=44 {
            let value = self
                .stat
                .iter()
                .rev()
                .find(|(f, _)| *f == field)
                .map(|(_, v)| *v)
                .unwrap_or(0);
            fields.push(value.to_string());
        }

        fs::write(dir.join("stat"), fields.join(" ") + "\n").unwrap();
        fs::write(dir.join("cmdline"), &self.cmdline).unwrap();
        fs::write(dir.join("io"), self.io).unwrap();
        fs::write(dir.join("status"), self.status).unwrap();
    }
}

fn procfs(processes: &[FakeProcess]) -> TempDir {
    let dir = tempdir().unwrap();
    for p in processes {
        p.write(dir.path());
    }
    dir
}

fn collector(root: &Path) -> Collector {
    Collector::new(CollectorOptions {
        proc_path: root.to_path_buf(),
        ..CollectorOptions::default()
    })
}

fn counter(metric: &CollectedMetric) -> u64 {
    metric
        .value
        .as_counter()
        .unwrap_or_else(|| panic!("{} is not a counter", metric.path))
}

fn network_manager() -> FakeProcess {
    FakeProcess::new(815, "NetworkManager", 'S')
        .cmdline("/usr/sbin/NetworkManager\0--no-daemon\0")
        .stat(10, 2433)
        .stat(12, 41)
        .stat(14, 1512)
        .stat(15, 884)
        .stat(23, 561_172_480)
        .stat(24, 4_839)
        .stat(28, 140_724_418_365_712)
        .stat(29, 140_724_418_364_128)
        .io("rchar: 260972212\nwchar: 995958\nsyscr: 1100676\nsyscw: 124253\nread_bytes: 0\nwrite_bytes: 0\ncancelled_write_bytes: 0\n")
        .status("Name:\tNetworkManager\nState:\tS (sleeping)\nVmData:\t  221884 kB\nVmExe:\t    2560 kB\nVmLib:\t   24011 kB\n")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_network_manager_scenario() {
    let root = procfs(&[network_manager()]);
    let c = collector(root.path());

    let out = c
        .collect_paths(&[
            "process/NetworkManager/815/ps_disk_ops_syscr",
            "state/sleeping",
            "state/running",
        ])
        .unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].path.to_string(), "process/NetworkManager/815/ps_disk_ops_syscr");
    assert_eq!(counter(&out[0]), 1_100_676);
    assert_eq!(counter(&out[1]), 1);
    assert_eq!(counter(&out[2]), 0);
}

#[test]
fn test_network_manager_memory_and_stack() {
    let root = procfs(&[network_manager()]);
    let out = collector(root.path())
        .collect_paths(&[
            "process/NetworkManager/815/ps_data",
            "process/NetworkManager/815/ps_code",
            "process/NetworkManager/815/ps_stacksize",
            "process/NetworkManager/815/ps_vm",
            "process/NetworkManager/815/ps_rss",
            "process/NetworkManager/815/ps_disk_octets_rchar",
        ])
        .unwrap();

    assert_eq!(counter(&out[0]), 227_209_216);
    assert_eq!(counter(&out[1]), (2560 + 24011) * 1024);
    assert_eq!(counter(&out[2]), 1584);
    assert_eq!(counter(&out[3]), 561_172_480);
    assert_eq!(counter(&out[4]), 4_839);
    assert_eq!(counter(&out[5]), 260_972_212);
}

#[test]
fn test_command_line_metrics() {
    let root = procfs(&[network_manager()]);
    let out = collector(root.path())
        .collect_paths(&[
            "process/NetworkManager/815/ps_cmd_line",
            "process/NetworkManager/815/ps_cmd",
        ])
        .unwrap();

    assert_eq!(
        out[0].value,
        MetricValue::Text("/usr/sbin/NetworkManager --no-daemon ".into())
    );
    assert_eq!(out[1].value, MetricValue::Text("/usr/sbin/NetworkManager".into()));
}

#[test]
fn test_instance_counts() {
    let root = procfs(&[
        FakeProcess::new(315, "fake", 'S'),
        FakeProcess::new(316, "fake", 'R'),
        network_manager(),
    ]);
    let c = collector(root.path());

    let out = c.collect_paths(&["process/fake/ps_count"]).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(counter(&out[0]), 2);

    let all = c.collect_paths(&["process/*/ps_count"]).unwrap();
    let names: Vec<String> = all.iter().map(|m| m.path.to_string()).collect();
    assert_eq!(
        names,
        vec!["process/NetworkManager/ps_count", "process/fake/ps_count"]
    );
    assert_eq!(all.iter().map(counter).sum::<u64>(), 3);
}

#[test]
fn test_malformed_query_fails_whole_batch() {
    let root = procfs(&[FakeProcess::new(315, "fake", 'S')]);
    let result = collector(root.path()).collect_paths(&["process/fake/ps_count", "process/zombie"]);
    assert!(matches!(result, Err(CollectError::Query(_))));
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn test_zombie_reports_no_segments() {
    let root = procfs(&[FakeProcess::new(900, "defunct", 'Z')
        .status("VmData:\t 999 kB\nVmExe:\t 999 kB\nVmLib:\t 999 kB\n")]);

    let out = collector(root.path())
        .collect_paths(&["process/defunct/900/ps_data", "process/defunct/900/ps_code"])
        .unwrap();
    assert_eq!(counter(&out[0]), 0);
    assert_eq!(counter(&out[1]), 0);
}

#[test]
fn test_zombie_without_status_file_is_kept() {
    let root = procfs(&[FakeProcess::new(901, "defunct", 'Z')]);
    fs::remove_file(root.path().join("901/status")).unwrap();

    let out = collector(root.path())
        .collect_paths(&["state/zombie"])
        .unwrap();
    assert_eq!(counter(&out[0]), 1);
}

#[test]
fn test_state_counts_sum_to_population() {
    let root = procfs(&[
        FakeProcess::new(1, "init", 'S'),
        FakeProcess::new(2, "worker", 'R'),
        FakeProcess::new(3, "worker", 'D'),
        FakeProcess::new(4, "defunct", 'Z'),
        FakeProcess::new(5, "traced", 't'),
        FakeProcess::new(6, "kworker", 'I'),
    ]);
    let c = collector(root.path());

    let snapshot = c.snapshot().unwrap();
    assert_eq!(snapshot.counts.total(), snapshot.table.instance_count() as u64);
    assert_eq!(snapshot.counts.get(ProcessState::Idle), 1);

    let states = c.collect_paths(&["state/*"]).unwrap();
    assert_eq!(states.len(), ProcessState::ALL.len());
    assert_eq!(states.iter().map(counter).sum::<u64>(), 6);
}

#[test]
fn test_aggregate_equals_sum_of_instances() {
    let root = procfs(&[
        FakeProcess::new(315, "fake", 'S').stat(23, 1000).stat(14, 7),
        FakeProcess::new(316, "fake", 'S').stat(23, 2500).stat(14, 5),
        FakeProcess::new(400, "other", 'S').stat(23, 9999),
    ]);
    let c = collector(root.path());

    for metric in ["ps_vm", "ps_cputime_user", "ps_disk_octets_wchar"] {
        let per_instance = c
            .collect_paths(&[format!("process/fake/*/{}", metric)])
            .unwrap();
        let aggregate = c
            .collect_paths(&[format!("process/fake/all/{}", metric)])
            .unwrap();

        assert_eq!(per_instance.len(), 2);
        assert_eq!(aggregate.len(), 1);
        assert_eq!(
            counter(&aggregate[0]),
            per_instance.iter().map(counter).sum::<u64>(),
            "aggregate mismatch for {}",
            metric
        );
    }
}

#[test]
fn test_wildcard_pid_on_absent_name_is_empty() {
    let root = procfs(&[FakeProcess::new(315, "fake", 'S')]);
    let out = collector(root.path())
        .collect_paths(&["process/ghost/*/ps_vm", "process/ghost/ps_count"])
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_system_processes_filtered_by_default() {
    let root = procfs(&[
        FakeProcess::new(2, "kthreadd", 'S').cmdline(""),
        FakeProcess::new(315, "fake", 'S'),
    ]);

    let default = collector(root.path()).snapshot().unwrap();
    assert_eq!(default.table.instance_count(), 1);

    let everything = Collector::new(CollectorOptions {
        proc_path: root.path().to_path_buf(),
        include_system_processes: true,
        ..CollectorOptions::default()
    })
    .snapshot()
    .unwrap();
    assert_eq!(everything.table.instance_count(), 2);
    assert!(everything.table.instance("kthreadd", 2).is_some());
}

#[test]
fn test_legacy_scaling_only_touches_counters() {
    let root = procfs(&[FakeProcess::new(315, "fake", 'S')
        .stat(10, 3)
        .stat(14, 12)
        .stat(23, 4096)]);
    let paths = [
        "process/fake/315/ps_cputime_user",
        "process/fake/315/ps_pagefaults_min",
        "process/fake/315/ps_vm",
    ];

    let raw = collector(root.path()).collect_paths(&paths).unwrap();
    let legacy = Collector::new(CollectorOptions {
        proc_path: root.path().to_path_buf(),
        scale: CounterScale::Legacy,
        ..CollectorOptions::default()
    })
    .collect_paths(&paths)
    .unwrap();

    assert_eq!(counter(&raw[0]), 12);
    assert_eq!(counter(&legacy[0]), 12 * LEGACY_COUNTER_SCALE);
    assert_eq!(counter(&legacy[1]), 3 * LEGACY_COUNTER_SCALE);
    assert_eq!(counter(&legacy[2]), counter(&raw[2]));
}

#[test]
fn test_scan_and_count_directly() {
    let root = procfs(&[
        FakeProcess::new(315, "fake", 'S'),
        FakeProcess::new(316, "fake", 'S'),
    ]);
    let table = scan(root.path()).unwrap();
    let counts = StateCounts::from_table(&table).unwrap();
    assert_eq!(counts.by_name("sleeping"), Some(2));
    assert_eq!(table.get("fake").map(|m| m.len()), Some(2));
}

#[test]
fn test_catalog_lists_every_template() {
    let types = metric_types();
    assert_eq!(types.len(), 40);
    assert!(types.iter().any(|t| t.template == "process/*/*/ps_vm"));
    assert!(types.iter().any(|t| t.template == "process/*/all/ps_vm"));
    assert!(types.iter().any(|t| t.template == "state/zombie"));
}
