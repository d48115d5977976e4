//! Process-wide tracing/logging setup shared by the binaries.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize tracing/logging in the given format.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
