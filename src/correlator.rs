//! Call-scoped correlation of lifecycle events.
//!
//! The transport hands every event of a call the same [`Context`]. At tag time
//! a [`CallRecord`] is attached to that context under a key type private to
//! this module, and every later event of the call reads it back. No shared map
//! is involved, so concurrent calls cannot observe each other's records and
//! nothing has to be cleaned up when a call finishes.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use http::Extensions;

/// Immutable, type-keyed values scoped to one connection or call.
///
/// Deriving a context with [`Context::with_value`] never changes the parent,
/// which is what keeps sibling calls on one connection isolated.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a derived context that also carries `value`, replacing any
    /// value of the same type.
    pub fn with_value<T: Clone + Send + Sync + 'static>(&self, value: T) -> Context {
        let mut values = self.values.clone();
        values.insert(value);
        Context { values }
    }

    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }
}

/// Per-call metadata shared by all events of one call.
#[derive(Debug)]
pub struct CallRecord {
    service: String,
    method: String,
    started_at: OnceLock<Instant>,
}

impl CallRecord {
    fn new(service: &str, method: &str) -> Self {
        CallRecord {
            service: service.to_string(),
            method: method.to_string(),
            started_at: OnceLock::new(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Records the start of the call. Only the first call has an effect;
    /// returns whether this one did.
    pub fn mark_started(&self, at: Instant) -> bool {
        self.started_at.set(at).is_ok()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }

    /// Time since the call started, or `None` if it never did.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at().map(|at| at.elapsed())
    }
}

// Only this module can name the key, so no other value can collide with it.
#[derive(Clone)]
struct CallRecordKey(Arc<CallRecord>);

/// Attaches a fresh call record to a context derived from `ctx`.
///
/// The transport must call this exactly once per call: a second attach on the
/// same chain shadows the first record.
pub fn attach(ctx: &Context, service: &str, method: &str) -> Context {
    ctx.with_value(CallRecordKey(Arc::new(CallRecord::new(service, method))))
}

/// Retrieves the call record attached to `ctx`, if any.
pub fn lookup(ctx: &Context) -> Option<Arc<CallRecord>> {
    ctx.value::<CallRecordKey>().map(|key| key.0.clone())
}
