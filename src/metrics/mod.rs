//! Metric instruments and the sets the handler observes into.
//!
//! [`MetricSet`] is backend-agnostic; [`PrometheusMetrics`] builds ready-made
//! sets on a Prometheus registry.

mod instruments;
mod recorder;
mod set;

pub use instruments::{Counter, Gauge, Histogram, Labels};
pub use recorder::{
    PromCounter, PromGauge, PromHistogram, PrometheusMetrics, DEFAULT_BYTES_BUCKETS,
    DEFAULT_LATENCY_BUCKETS,
};
pub use set::MetricSet;
