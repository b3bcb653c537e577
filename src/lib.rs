//! Metrics instrumentation for RPC clients and servers.
//!
//! A [`Handler`] plugs into the transport as a [`StatsHandler`] and turns
//! connection and call lifecycle events into observations on a [`MetricSet`]:
//!
//! ```text
//! <direction>_connections_open                        gauge
//! <direction>_connections_total                       counter
//! <direction>_requests_pending{service,method}        gauge
//! <direction>_requests_total{service,method,code}     counter
//! <direction>_latency_seconds{service,method,code}    histogram
//! <direction>_sent_bytes{service,method,frame}        histogram
//! <direction>_recv_bytes{service,method,frame}        histogram
//! ```
//!
//! Instruments left unset in a [`MetricSet`] are simply not observed.

pub mod config;
pub mod correlator;
pub mod handler;
pub mod method;
pub mod metrics;
pub mod stats;
pub mod status;
pub mod utils;

pub use handler::{client_handler, server_handler, Handler};
pub use metrics::MetricSet;
pub use stats::StatsHandler;
