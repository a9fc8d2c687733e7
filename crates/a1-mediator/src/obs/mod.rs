//! Lightweight in-process metrics.
//!
//! Counters and a latency histogram for SDL calls and store outcomes, stored
//! as atomics and rendered by the `/metrics` handler in Prometheus text format.

pub mod metrics;

pub use metrics::StoreMetrics;
