//! Capability traits a metrics backend implements to receive observations.
//!
//! Labels are passed as ordered `(name, value)` pairs. Implementations must be
//! safe to call from many threads at once.

/// Label name/value pairs attached to one observation.
pub type Labels<'a> = &'a [(&'a str, &'a str)];

/// A monotonically increasing value.
pub trait Counter: Send + Sync {
    fn add(&self, labels: Labels<'_>, delta: f64);
}

/// A value that can go up and down.
pub trait Gauge: Send + Sync {
    fn add(&self, labels: Labels<'_>, delta: f64);
}

/// A distribution of observed values.
pub trait Histogram: Send + Sync {
    fn observe(&self, labels: Labels<'_>, value: f64);
}
