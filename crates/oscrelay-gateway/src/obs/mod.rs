//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics and rendered by the `/metrics` handler in
//! Prometheus text format. Point-in-time gauges are passed in at render time.

pub mod metrics;

pub use metrics::RelayMetrics;
