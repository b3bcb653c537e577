//! Metric sets backed by a Prometheus registry.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::Collector;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use tracing::{debug, warn};

use super::instruments::{Counter, Gauge, Histogram, Labels};
use super::set::MetricSet;
use crate::config::MetricsConfig;

/// Default latency histogram buckets, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Default byte-size histogram buckets.
pub const DEFAULT_BYTES_BUCKETS: [f64; 12] = [
    0.0, 32.0, 64.0, 128.0, 256.0, 512.0, 1024.0, 2048.0, 8192.0, 32768.0, 131072.0, 524288.0,
];

const CALL_LABELS: &[&str] = &["service", "method"];
const RESULT_LABELS: &[&str] = &["service", "method", "code"];
const FRAME_LABELS: &[&str] = &["service", "method", "frame"];

fn label_map<'a>(labels: Labels<'a>) -> HashMap<&'a str, &'a str> {
    labels.iter().copied().collect()
}

/// A [`Counter`] over a Prometheus counter family.
#[derive(Clone)]
pub struct PromCounter {
    vec: CounterVec,
}

impl Counter for PromCounter {
    fn add(&self, labels: Labels<'_>, delta: f64) {
        if delta < 0.0 {
            warn!(delta, "Ignoring negative counter increment");
            return;
        }
        match self.vec.get_metric_with(&label_map(labels)) {
            Ok(counter) => counter.inc_by(delta),
            Err(e) => warn!("Dropping counter observation: {}", e),
        }
    }
}

/// A [`Gauge`] over a Prometheus gauge family.
#[derive(Clone)]
pub struct PromGauge {
    vec: GaugeVec,
}

impl Gauge for PromGauge {
    fn add(&self, labels: Labels<'_>, delta: f64) {
        match self.vec.get_metric_with(&label_map(labels)) {
            Ok(gauge) => gauge.add(delta),
            Err(e) => warn!("Dropping gauge observation: {}", e),
        }
    }
}

/// A [`Histogram`] over a Prometheus histogram family.
#[derive(Clone)]
pub struct PromHistogram {
    vec: HistogramVec,
}

impl Histogram for PromHistogram {
    fn observe(&self, labels: Labels<'_>, value: f64) {
        match self.vec.get_metric_with(&label_map(labels)) {
            Ok(histogram) => histogram.observe(value),
            Err(e) => warn!("Dropping histogram observation: {}", e),
        }
    }
}

/// Client and server metric sets registered on one Prometheus registry.
///
/// Metric names are `<namespace>_<client|server>_<metric>`, e.g.
/// `grpc_client_requests_total`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Arc<Registry>,
    client: Arc<MetricSet>,
    server: Arc<MetricSet>,
}

impl PrometheusMetrics {
    /// Creates both metric sets on a fresh registry.
    pub fn new(config: &MetricsConfig) -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());
        let client = Arc::new(register_set(&registry, config, "client")?);
        let server = Arc::new(register_set(&registry, config, "server")?);

        debug!(namespace = %config.namespace, "Registered RPC metrics");

        Ok(PrometheusMetrics {
            registry,
            client,
            server,
        })
    }

    pub fn client(&self) -> Arc<MetricSet> {
        self.client.clone()
    }

    pub fn server(&self) -> Arc<MetricSet> {
        self.server.clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn register<C: Collector + Clone + 'static>(
    registry: &Registry,
    collector: C,
) -> Result<C, prometheus::Error> {
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

fn register_set(
    registry: &Registry,
    config: &MetricsConfig,
    direction: &str,
) -> Result<MetricSet, prometheus::Error> {
    let opts = |name: &str, help: String| {
        Opts::new(name, help)
            .namespace(config.namespace.clone())
            .subsystem(direction)
    };
    // Inbound traffic is the response on a client and the request on a server.
    let (recv_what, sent_what) = match direction {
        "client" => ("responses", "requests"),
        _ => ("requests", "responses"),
    };

    let conns_open = register(
        registry,
        GaugeVec::new(
            opts(
                "connections_open",
                format!("Number of RPC {} connections open.", direction),
            ),
            &[],
        )?,
    )?;
    let conns_total = register(
        registry,
        CounterVec::new(
            opts(
                "connections_total",
                format!("Total number of RPC {} connections opened.", direction),
            ),
            &[],
        )?,
    )?;
    let reqs_pending = register(
        registry,
        GaugeVec::new(
            opts(
                "requests_pending",
                format!("Number of RPC {} requests pending.", direction),
            ),
            CALL_LABELS,
        )?,
    )?;
    let reqs_total = register(
        registry,
        CounterVec::new(
            opts(
                "requests_total",
                format!("Total number of RPC {} requests completed.", direction),
            ),
            RESULT_LABELS,
        )?,
    )?;

    let mut set = MetricSet {
        conns_open: Some(Arc::new(PromGauge { vec: conns_open })),
        conns_total: Some(Arc::new(PromCounter { vec: conns_total })),
        reqs_pending: Some(Arc::new(PromGauge { vec: reqs_pending })),
        reqs_total: Some(Arc::new(PromCounter { vec: reqs_total })),
        ..MetricSet::default()
    };

    if config.latency {
        let latency = register(
            registry,
            HistogramVec::new(
                HistogramOpts::from(opts(
                    "latency_seconds",
                    format!("Latency of RPC {} requests.", direction),
                ))
                .buckets(config.latency_buckets.clone()),
                RESULT_LABELS,
            )?,
        )?;
        set.latency = Some(Arc::new(PromHistogram { vec: latency }));
    }
    if config.bytes_sent {
        let bytes_sent = register(
            registry,
            HistogramVec::new(
                HistogramOpts::from(opts(
                    "sent_bytes",
                    format!("Bytes sent in RPC {} {}.", direction, sent_what),
                ))
                .buckets(config.bytes_buckets.clone()),
                FRAME_LABELS,
            )?,
        )?;
        set.bytes_sent = Some(Arc::new(PromHistogram { vec: bytes_sent }));
    }
    if config.bytes_recv {
        let bytes_recv = register(
            registry,
            HistogramVec::new(
                HistogramOpts::from(opts(
                    "recv_bytes",
                    format!("Bytes received in RPC {} {}.", direction, recv_what),
                ))
                .buckets(config.bytes_buckets.clone()),
                FRAME_LABELS,
            )?,
        )?;
        set.bytes_recv = Some(Arc::new(PromHistogram { vec: bytes_recv }));
    }

    Ok(set)
}
