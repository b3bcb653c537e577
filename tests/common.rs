#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rpcmon::correlator::Context;
use rpcmon::metrics::{Counter, Gauge, Histogram, Labels, MetricSet};
use rpcmon::stats::{RpcError, RpcStats, RpcTagInfo, StatsHandler};

pub fn label_key(labels: Labels<'_>) -> String {
    labels
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Counter/gauge double that keeps the running sum per label set.
#[derive(Default)]
pub struct RecordingSum {
    sums: Mutex<HashMap<String, f64>>,
}

impl RecordingSum {
    pub fn get(&self, labels: Labels<'_>) -> f64 {
        self.sums
            .lock()
            .unwrap()
            .get(&label_key(labels))
            .copied()
            .unwrap_or(0.0)
    }

    fn record(&self, labels: Labels<'_>, delta: f64) {
        *self.sums.lock().unwrap().entry(label_key(labels)).or_insert(0.0) += delta;
    }
}

impl Counter for RecordingSum {
    fn add(&self, labels: Labels<'_>, delta: f64) {
        self.record(labels, delta);
    }
}

impl Gauge for RecordingSum {
    fn add(&self, labels: Labels<'_>, delta: f64) {
        self.record(labels, delta);
    }
}

/// Histogram double that keeps every observation.
#[derive(Default)]
pub struct RecordingHistogram {
    observations: Mutex<Vec<(String, f64)>>,
}

impl RecordingHistogram {
    pub fn values(&self, labels: Labels<'_>) -> Vec<f64> {
        let key = label_key(labels);
        self.observations
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.observations.lock().unwrap().len()
    }
}

impl Histogram for RecordingHistogram {
    fn observe(&self, labels: Labels<'_>, value: f64) {
        self.observations
            .lock()
            .unwrap()
            .push((label_key(labels), value));
    }
}

/// A metric set wired to recording doubles, keeping handles for assertions.
#[derive(Clone)]
pub struct Recorded {
    pub conns_open: Arc<RecordingSum>,
    pub conns_total: Arc<RecordingSum>,
    pub reqs_pending: Arc<RecordingSum>,
    pub reqs_total: Arc<RecordingSum>,
    pub latency: Arc<RecordingHistogram>,
    pub bytes_sent: Arc<RecordingHistogram>,
    pub bytes_recv: Arc<RecordingHistogram>,
}

impl Recorded {
    pub fn new() -> Self {
        Recorded {
            conns_open: Arc::default(),
            conns_total: Arc::default(),
            reqs_pending: Arc::default(),
            reqs_total: Arc::default(),
            latency: Arc::default(),
            bytes_sent: Arc::default(),
            bytes_recv: Arc::default(),
        }
    }

    /// Every instrument set.
    pub fn metric_set(&self) -> Arc<MetricSet> {
        Arc::new(MetricSet {
            conns_open: Some(self.conns_open.clone()),
            conns_total: Some(self.conns_total.clone()),
            reqs_pending: Some(self.reqs_pending.clone()),
            reqs_total: Some(self.reqs_total.clone()),
            latency: Some(self.latency.clone()),
            bytes_sent: Some(self.bytes_sent.clone()),
            bytes_recv: Some(self.bytes_recv.clone()),
        })
    }
}

pub fn tag(handler: &dyn StatsHandler, full_method_name: &str) -> Context {
    handler.tag_rpc(
        Context::new(),
        &RpcTagInfo {
            full_method_name: full_method_name.to_string(),
            fail_fast: true,
        },
    )
}

pub fn begin(client: bool, begin_time: Instant) -> RpcStats {
    RpcStats::Begin {
        client,
        begin_time,
        fail_fast: true,
    }
}

pub fn end(client: bool, begin_time: Instant, error: Option<RpcError>) -> RpcStats {
    RpcStats::End {
        client,
        begin_time,
        end_time: Instant::now(),
        error,
    }
}

pub fn call(service: &'static str, method: &'static str) -> [(&'static str, &'static str); 2] {
    [("service", service), ("method", method)]
}

pub fn result(
    service: &'static str,
    method: &'static str,
    code: &'static str,
) -> [(&'static str, &'static str); 3] {
    [("service", service), ("method", method), ("code", code)]
}

pub fn frame(
    service: &'static str,
    method: &'static str,
    frame: &'static str,
) -> [(&'static str, &'static str); 3] {
    [("service", service), ("method", method), ("frame", frame)]
}
