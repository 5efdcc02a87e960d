//! Query patterns: parsing `/`-separated metric paths into typed segments.
//!
//! Grammar (case-sensitive):
//! - `process/<name-or-*>/<pid-or-*-or-all>/<metric>`
//! - `process/<name-or-*>/ps_count`
//! - `state/<state-name-or-*>`

use std::fmt;
use std::str::FromStr;

use crate::catalog::{
    AGGREGATE_TOKEN, COUNT_METRIC, PROCESS_CATEGORY, STATE_CATEGORY, WILDCARD_TOKEN,
};
use crate::error::QueryError;
use crate::metric::ProcessMetric;

/// A dynamic query segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<T> {
    Exact(T),
    Wildcard,
    /// Sum across instances. Only produced for the pid position.
    Aggregate,
}

impl<T: fmt::Display> fmt::Display for Segment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Exact(v) => write!(f, "{}", v),
            Segment::Wildcard => f.write_str(WILDCARD_TOKEN),
            Segment::Aggregate => f.write_str(AGGREGATE_TOKEN),
        }
    }
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPattern {
    /// `state/<name>`; the name is not validated so unknown states resolve
    /// to nothing instead of failing.
    State(Segment<String>),
    /// `process/<name>/ps_count`
    InstanceCount { name: Segment<String> },
    /// `process/<name>/<pid>/<metric>`
    ProcessMetric {
        name: Segment<String>,
        pid: Segment<u32>,
        metric: ProcessMetric,
    },
}

fn name_segment(raw: &str) -> Segment<String> {
    if raw == WILDCARD_TOKEN {
        Segment::Wildcard
    } else {
        Segment::Exact(raw.to_string())
    }
}

fn pid_segment(raw: &str) -> Result<Segment<u32>, QueryError> {
    match raw {
        WILDCARD_TOKEN => Ok(Segment::Wildcard),
        AGGREGATE_TOKEN => Ok(Segment::Aggregate),
        _ => raw
            .parse()
            .map(Segment::Exact)
            .map_err(|_| QueryError::InvalidPid(raw.to_string())),
    }
}

impl QueryPattern {
    /// Parses a `/`-separated path. Leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> Result<Self, QueryError> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        Self::from_segments(&segments)
    }

    /// Builds a pattern from already-split segments.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, QueryError> {
        let segs: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        let Some(category) = segs.first() else {
            return Err(QueryError::Empty);
        };
        if let Some(pos) = segs.iter().position(|s| s.is_empty()) {
            return Err(QueryError::EmptySegment(pos));
        }

        match *category {
            STATE_CATEGORY => match segs.as_slice() {
                [_, state] => Ok(QueryPattern::State(name_segment(state))),
                _ => Err(QueryError::SegmentCount {
                    category: STATE_CATEGORY,
                    expected: "2",
                    actual: segs.len(),
                }),
            },
            PROCESS_CATEGORY => match segs.as_slice() {
                [_, name, last] => {
                    if *last != COUNT_METRIC {
                        return Err(QueryError::ExpectedCount(last.to_string()));
                    }
                    Ok(QueryPattern::InstanceCount {
                        name: name_segment(name),
                    })
                }
                [_, name, pid, metric] => {
                    let metric = ProcessMetric::from_name(metric)
                        .ok_or_else(|| QueryError::UnknownMetric(metric.to_string()))?;
                    let pid = pid_segment(pid)?;
                    if pid == Segment::Aggregate && !metric.is_additive() {
                        return Err(QueryError::NotAggregatable(metric.name().to_string()));
                    }
                    Ok(QueryPattern::ProcessMetric {
                        name: name_segment(name),
                        pid,
                        metric,
                    })
                }
                _ => Err(QueryError::SegmentCount {
                    category: PROCESS_CATEGORY,
                    expected: "3 or 4",
                    actual: segs.len(),
                }),
            },
            other => Err(QueryError::UnknownCategory(other.to_string())),
        }
    }
}

impl FromStr for QueryPattern {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPattern::State(state) => write!(f, "{}/{}", STATE_CATEGORY, state),
            QueryPattern::InstanceCount { name } => {
                write!(f, "{}/{}/{}", PROCESS_CATEGORY, name, COUNT_METRIC)
            }
            QueryPattern::ProcessMetric { name, pid, metric } => {
                write!(f, "{}/{}/{}/{}", PROCESS_CATEGORY, name, pid, metric)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_query() {
        assert_eq!(
            QueryPattern::parse("state/sleeping"),
            Ok(QueryPattern::State(Segment::Exact("sleeping".into())))
        );
        assert_eq!(
            QueryPattern::parse("state/*"),
            Ok(QueryPattern::State(Segment::Wildcard))
        );
    }

    #[test]
    fn test_parse_instance_count() {
        assert_eq!(
            QueryPattern::parse("process/fake/ps_count"),
            Ok(QueryPattern::InstanceCount {
                name: Segment::Exact("fake".into())
            })
        );
        assert_eq!(
            QueryPattern::parse("/process/*/ps_count/"),
            Ok(QueryPattern::InstanceCount {
                name: Segment::Wildcard
            })
        );
    }

    #[test]
    fn test_parse_process_metric() {
        assert_eq!(
            QueryPattern::parse("process/NetworkManager/815/ps_disk_ops_syscr"),
            Ok(QueryPattern::ProcessMetric {
                name: Segment::Exact("NetworkManager".into()),
                pid: Segment::Exact(815),
                metric: ProcessMetric::DiskOpsSyscr,
            })
        );
        assert_eq!(
            QueryPattern::parse("process/*/all/ps_vm"),
            Ok(QueryPattern::ProcessMetric {
                name: Segment::Wildcard,
                pid: Segment::Aggregate,
                metric: ProcessMetric::Vm,
            })
        );
    }

    #[test]
    fn test_aggregate_token_only_special_in_pid_position() {
        assert_eq!(
            QueryPattern::parse("process/all/*/ps_vm"),
            Ok(QueryPattern::ProcessMetric {
                name: Segment::Exact("all".into()),
                pid: Segment::Wildcard,
                metric: ProcessMetric::Vm,
            })
        );
    }

    #[test]
    fn test_wrong_segment_count() {
        assert!(matches!(
            QueryPattern::parse("process/zombie"),
            Err(QueryError::SegmentCount { actual: 2, .. })
        ));
        assert!(matches!(
            QueryPattern::parse("process/a/1/ps_vm/extra"),
            Err(QueryError::SegmentCount { actual: 5, .. })
        ));
        assert!(matches!(
            QueryPattern::parse("state"),
            Err(QueryError::SegmentCount { actual: 1, .. })
        ));
        assert!(matches!(
            QueryPattern::parse("state/sleeping/now"),
            Err(QueryError::SegmentCount { actual: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(QueryPattern::parse(""), Err(QueryError::Empty));
        assert_eq!(QueryPattern::parse("///"), Err(QueryError::Empty));
        assert_eq!(
            QueryPattern::parse("thread/a/ps_count"),
            Err(QueryError::UnknownCategory("thread".into()))
        );
        assert_eq!(
            QueryPattern::parse("Process/a/ps_count"),
            Err(QueryError::UnknownCategory("Process".into()))
        );
        assert_eq!(
            QueryPattern::parse("process/a/ps_vm"),
            Err(QueryError::ExpectedCount("ps_vm".into()))
        );
        assert_eq!(
            QueryPattern::parse("process/a/x1/ps_vm"),
            Err(QueryError::InvalidPid("x1".into()))
        );
        assert_eq!(
            QueryPattern::parse("process/a/-1/ps_vm"),
            Err(QueryError::InvalidPid("-1".into()))
        );
        assert_eq!(
            QueryPattern::parse("process/a/1/ps_nope"),
            Err(QueryError::UnknownMetric("ps_nope".into()))
        );
        assert_eq!(
            QueryPattern::parse("process//1/ps_vm"),
            Err(QueryError::EmptySegment(1))
        );
    }

    #[test]
    fn test_text_metric_cannot_be_aggregated() {
        assert_eq!(
            QueryPattern::parse("process/a/all/ps_cmd_line"),
            Err(QueryError::NotAggregatable("ps_cmd_line".into()))
        );
        assert!(QueryPattern::parse("process/a/*/ps_cmd_line").is_ok());
    }

    #[test]
    fn test_display_reproduces_path() {
        for path in [
            "state/zombie",
            "process/*/ps_count",
            "process/fake/*/ps_rss",
            "process/*/all/ps_cputime_user",
            "process/NetworkManager/815/ps_cmd",
        ] {
            let pattern: QueryPattern = path.parse().unwrap();
            assert_eq!(pattern.to_string(), path);
        }
    }

    #[test]
    fn test_from_segments() {
        let segs = vec!["process".to_string(), "fake".to_string(), "ps_count".to_string()];
        assert!(QueryPattern::from_segments(&segs).is_ok());
        let none: [&str; 0] = [];
        assert_eq!(QueryPattern::from_segments(&none), Err(QueryError::Empty));
    }
}
