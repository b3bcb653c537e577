//! Parsing of full RPC method names.

/// Label value used when a full method name cannot be split.
pub const UNKNOWN: &str = "unknown";

/// Splits a full method name of the form `/service/method` into its
/// service and method parts.
///
/// A single leading `/` is optional. Names without a separator degrade to
/// `("unknown", "unknown")` rather than failing.
pub fn split_full_method_name(full_method_name: &str) -> (&str, &str) {
    let name = full_method_name
        .strip_prefix('/')
        .unwrap_or(full_method_name);
    match name.split_once('/') {
        Some((service, method)) => (service, method),
        None => (UNKNOWN, UNKNOWN),
    }
}
