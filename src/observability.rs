//! Logging for the dispatch layer.
//!
//! All events go through `tracing` with target "coldispatch" and carry an
//! `event` field. The crate never installs a subscriber; applications
//! configure one themselves.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: subsystem (e.g., "dispatch", "reduce", "engine")
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all coldispatch log events.
pub(crate) const COLDISPATCH_TARGET: &str = "coldispatch";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "dispatch",
///     event = "binary_op",
///     operator = op.name(),
///     output_type = %output,
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::COLDISPATCH_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::observability::COLDISPATCH_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::COLDISPATCH_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_trace;
pub(crate) use log_warn;
