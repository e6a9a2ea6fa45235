//! Tracing/logging setup shared by the binaries.

pub mod tracing;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines on stderr; the CLI default.
    #[default]
    Plain,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
