use std::fmt;
use std::sync::Arc;

use super::instruments::{Counter, Gauge, Histogram};

/// The instruments for one traffic direction.
///
/// Any instrument may be left as `None`; observations for it are skipped.
/// `MetricSet::default()` observes nothing.
#[derive(Clone, Default)]
pub struct MetricSet {
    /// `connections_open`, no labels.
    pub conns_open: Option<Arc<dyn Gauge>>,
    /// `connections_total`, no labels.
    pub conns_total: Option<Arc<dyn Counter>>,
    /// `requests_pending{service,method}`.
    pub reqs_pending: Option<Arc<dyn Gauge>>,
    /// `requests_total{service,method,code}`.
    pub reqs_total: Option<Arc<dyn Counter>>,
    /// `latency_seconds{service,method,code}`.
    pub latency: Option<Arc<dyn Histogram>>,
    /// `sent_bytes{service,method,frame}`.
    pub bytes_sent: Option<Arc<dyn Histogram>>,
    /// `recv_bytes{service,method,frame}`.
    pub bytes_recv: Option<Arc<dyn Histogram>>,
}

impl fmt::Debug for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSet")
            .field("conns_open", &self.conns_open.is_some())
            .field("conns_total", &self.conns_total.is_some())
            .field("reqs_pending", &self.reqs_pending.is_some())
            .field("reqs_total", &self.reqs_total.is_some())
            .field("latency", &self.latency.is_some())
            .field("bytes_sent", &self.bytes_sent.is_some())
            .field("bytes_recv", &self.bytes_recv.is_some())
            .finish()
    }
}
