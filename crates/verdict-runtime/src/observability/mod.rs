//! Observability module
//!
//! Counters and histograms for parsing and evaluation. Logging goes through
//! `tracing`; subscribers are installed by the host binary.

pub mod metrics;

pub use metrics::{names, Counter, Histogram, Metrics, MetricsCollector, HISTOGRAM_WINDOW};
