//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing with an explicit default level.
///
/// `RUST_LOG` still wins when it is set. Safe to call multiple times;
/// subsequent calls become no-ops.
pub fn init_with_default(default_filter: &str) {
    tracing::init(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
