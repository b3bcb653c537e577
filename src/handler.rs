//! Translation of transport lifecycle events into metric observations.

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::correlator::{self, CallRecord, Context};
use crate::method::split_full_method_name;
use crate::metrics::{Histogram, MetricSet};
use crate::stats::{ConnStats, ConnTagInfo, RpcStats, RpcTagInfo, StatsHandler};
use crate::status::Code;

const HEADER: &str = "header";
const PAYLOAD: &str = "payload";
const TRAILER: &str = "trailer";

/// Returns a handler that instruments the client side of connections.
pub fn client_handler(metrics: Arc<MetricSet>) -> Handler {
    Handler::new(Some(metrics), None)
}

/// Returns a handler that instruments the server side of connections.
pub fn server_handler(metrics: Arc<MetricSet>) -> Handler {
    Handler::new(None, Some(metrics))
}

/// A [`StatsHandler`] recording connection and call metrics.
///
/// Each event picks the client or server metric set from its own direction
/// flag. Events for a direction with no metric set are ignored.
#[derive(Debug, Clone, Default)]
pub struct Handler {
    client: Option<Arc<MetricSet>>,
    server: Option<Arc<MetricSet>>,
}

impl Handler {
    /// Creates a handler for a process that may be both client and server.
    pub fn new(client: Option<Arc<MetricSet>>, server: Option<Arc<MetricSet>>) -> Self {
        Handler { client, server }
    }

    fn metrics_for(&self, client: bool) -> Option<&MetricSet> {
        if client {
            self.client.as_deref()
        } else {
            self.server.as_deref()
        }
    }

    fn call_begin(&self, m: &MetricSet, call: &CallRecord, begin_time: Instant) {
        if !call.mark_started(begin_time) {
            debug!(
                rpc_service = call.service(),
                rpc_method = call.method(),
                "Call already started; keeping first start time"
            );
        }
        if let Some(pending) = &m.reqs_pending {
            pending.add(&[("service", call.service()), ("method", call.method())], 1.0);
        }
    }

    fn call_end(&self, m: &MetricSet, call: &CallRecord, code: Code) {
        let code = code.as_str();
        trace!(
            rpc_service = call.service(),
            rpc_method = call.method(),
            rpc_code = code,
            "Call ended"
        );
        let labels = [
            ("service", call.service()),
            ("method", call.method()),
            ("code", code),
        ];
        if let Some(latency) = &m.latency {
            match call.elapsed() {
                Some(elapsed) => latency.observe(&labels, elapsed.as_secs_f64()),
                None => debug!(
                    rpc_service = call.service(),
                    rpc_method = call.method(),
                    "Call ended without a start time; skipping latency"
                ),
            }
        }
        if let Some(total) = &m.reqs_total {
            total.add(&labels, 1.0);
        }
        if let Some(pending) = &m.reqs_pending {
            pending.add(&[("service", call.service()), ("method", call.method())], -1.0);
        }
    }
}

fn observe_frame(
    histogram: &Option<Arc<dyn Histogram>>,
    call: &CallRecord,
    frame: &str,
    bytes: usize,
) {
    if let Some(histogram) = histogram {
        let labels = [
            ("service", call.service()),
            ("method", call.method()),
            ("frame", frame),
        ];
        histogram.observe(&labels, bytes as f64);
    }
}

impl StatsHandler for Handler {
    fn tag_rpc(&self, ctx: Context, info: &RpcTagInfo) -> Context {
        let (service, method) = split_full_method_name(&info.full_method_name);
        correlator::attach(&ctx, service, method)
    }

    fn handle_rpc(&self, ctx: &Context, stats: &RpcStats) {
        let call = match correlator::lookup(ctx) {
            Some(call) => call,
            None => {
                debug!("No call record in context; dropping RPC event");
                return;
            }
        };
        let m = match self.metrics_for(stats.is_client()) {
            Some(m) => m,
            None => return,
        };
        trace!(
            rpc_service = call.service(),
            rpc_method = call.method(),
            client = stats.is_client(),
            "Handling RPC event"
        );

        match stats {
            RpcStats::Begin { begin_time, .. } => self.call_begin(m, &call, *begin_time),
            RpcStats::End { error, .. } => {
                let error = error.as_ref().map(|e| &**e as &(dyn Error + 'static));
                self.call_end(m, &call, Code::from_error(error))
            }
            RpcStats::InHeader { wire_length, .. } => {
                observe_frame(&m.bytes_recv, &call, HEADER, *wire_length)
            }
            RpcStats::InPayload { wire_length, .. } => {
                observe_frame(&m.bytes_recv, &call, PAYLOAD, *wire_length)
            }
            RpcStats::InTrailer { wire_length, .. } => {
                observe_frame(&m.bytes_recv, &call, TRAILER, *wire_length)
            }
            // The transport reports no wire length for outbound headers, so
            // this records 0 rather than the real header size.
            RpcStats::OutHeader { .. } => observe_frame(&m.bytes_sent, &call, HEADER, 0),
            RpcStats::OutPayload { wire_length, .. } => {
                observe_frame(&m.bytes_sent, &call, PAYLOAD, *wire_length)
            }
            RpcStats::OutTrailer { wire_length, .. } => {
                observe_frame(&m.bytes_sent, &call, TRAILER, *wire_length)
            }
        }
    }

    fn tag_conn(&self, ctx: Context, _info: &ConnTagInfo) -> Context {
        ctx
    }

    fn handle_conn(&self, _ctx: &Context, stats: &ConnStats) {
        let m = match self.metrics_for(stats.is_client()) {
            Some(m) => m,
            None => return,
        };
        match stats {
            ConnStats::Begin { .. } => {
                if let Some(open) = &m.conns_open {
                    open.add(&[], 1.0);
                }
                if let Some(total) = &m.conns_total {
                    total.add(&[], 1.0);
                }
            }
            ConnStats::End { .. } => {
                if let Some(open) = &m.conns_open {
                    open.add(&[], -1.0);
                }
            }
        }
    }
}
