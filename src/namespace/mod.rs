//! Hierarchical metric namespace: query patterns and their resolution.

pub mod query;
pub mod resolver;

pub use query::{QueryPattern, Segment};
pub use resolver::{resolve, MetricPath, ResolvedMetric, Resolver};
