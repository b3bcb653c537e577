use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::{DEFAULT_BYTES_BUCKETS, DEFAULT_LATENCY_BUCKETS};

/// Options for the Prometheus-backed metric sets.
///
/// The three histograms can be switched off individually; the connection and
/// request counters and gauges are always registered.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prefix of every metric name, e.g. `grpc` in `grpc_client_requests_total`.
    pub namespace: String,
    pub latency_buckets: Vec<f64>,
    pub bytes_buckets: Vec<f64>,
    pub latency: bool,
    pub bytes_sent: bool,
    pub bytes_recv: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            namespace: "grpc".to_string(),
            latency_buckets: DEFAULT_LATENCY_BUCKETS.to_vec(),
            bytes_buckets: DEFAULT_BYTES_BUCKETS.to_vec(),
            latency: true,
            bytes_sent: true,
            bytes_recv: true,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.namespace.trim().is_empty() {
            return Err("metrics.namespace must not be empty".to_string());
        }
        if !is_metric_name(&self.namespace) {
            return Err(format!(
                "metrics.namespace '{}' must match [a-zA-Z_:][a-zA-Z0-9_:]*",
                self.namespace
            ));
        }
        check_buckets("metrics.latency_buckets", &self.latency_buckets)?;
        check_buckets("metrics.bytes_buckets", &self.bytes_buckets)?;
        Ok(())
    }
}

// Prometheus metric name grammar; the namespace becomes the name prefix.
fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn check_buckets(field: &str, buckets: &[f64]) -> Result<(), String> {
    if buckets.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(format!("{} must be strictly increasing", field));
    }
    Ok(())
}
