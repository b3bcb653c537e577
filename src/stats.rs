//! Lifecycle events produced by the RPC transport, and the observer contract
//! it drives.

use std::net::SocketAddr;
use std::time::Instant;

use crate::correlator::Context;

/// Terminal error of a failed call.
pub type RpcError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Information available when a call is tagged, before any of its events.
#[derive(Debug, Clone)]
pub struct RpcTagInfo {
    /// Full method name, e.g. `/pkg.Service/Method`.
    pub full_method_name: String,
    pub fail_fast: bool,
}

/// Information available when a connection is tagged.
#[derive(Debug, Clone, Default)]
pub struct ConnTagInfo {
    pub remote_addr: Option<SocketAddr>,
    pub local_addr: Option<SocketAddr>,
}

/// Events in the lifecycle of a single call.
#[derive(Debug)]
pub enum RpcStats {
    Begin {
        client: bool,
        begin_time: Instant,
        fail_fast: bool,
    },
    End {
        client: bool,
        begin_time: Instant,
        end_time: Instant,
        error: Option<RpcError>,
    },
    InHeader {
        client: bool,
        full_method: String,
        wire_length: usize,
        header_count: usize,
    },
    InPayload {
        client: bool,
        length: usize,
        wire_length: usize,
        recv_time: Instant,
    },
    InTrailer {
        client: bool,
        wire_length: usize,
    },
    /// Outbound headers; the transport does not report their wire length.
    OutHeader {
        client: bool,
        full_method: String,
    },
    OutPayload {
        client: bool,
        length: usize,
        wire_length: usize,
        sent_time: Instant,
    },
    OutTrailer {
        client: bool,
        wire_length: usize,
    },
}

impl RpcStats {
    pub fn is_client(&self) -> bool {
        match self {
            RpcStats::Begin { client, .. }
            | RpcStats::End { client, .. }
            | RpcStats::InHeader { client, .. }
            | RpcStats::InPayload { client, .. }
            | RpcStats::InTrailer { client, .. }
            | RpcStats::OutHeader { client, .. }
            | RpcStats::OutPayload { client, .. }
            | RpcStats::OutTrailer { client, .. } => *client,
        }
    }
}

/// Events in the lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnStats {
    Begin { client: bool },
    End { client: bool },
}

impl ConnStats {
    pub fn is_client(&self) -> bool {
        match self {
            ConnStats::Begin { client } | ConnStats::End { client } => *client,
        }
    }
}

/// An observer plugged into the transport.
///
/// `tag_*` run first and may derive a context that the transport then passes
/// to every `handle_*` call for the same call or connection. Implementations
/// are invoked concurrently and must return promptly.
pub trait StatsHandler: Send + Sync {
    fn tag_rpc(&self, ctx: Context, info: &RpcTagInfo) -> Context;
    fn handle_rpc(&self, ctx: &Context, stats: &RpcStats);
    fn tag_conn(&self, ctx: Context, info: &ConnTagInfo) -> Context;
    fn handle_conn(&self, ctx: &Context, stats: &ConnStats);
}
