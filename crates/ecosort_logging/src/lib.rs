#![deny(missing_docs)]
//! Shared logging utilities for the EcoSort workspace.
//!
//! This crate provides the `eco_*` logging macros used across the codebase,
//! a per-thread scan context that the macros stamp onto every line, and a
//! minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local id of the classification request currently being handled.
    static SCAN_CONTEXT: Cell<u64> = const { Cell::new(0) };
}

/// Marks the current thread as working on classification request `scan_id`.
/// Pass 0 to clear the context.
pub fn set_scan_context(scan_id: u64) {
    SCAN_CONTEXT.with(|v| v.set(scan_id));
}

/// Retrieves the classification request id for the current thread.
/// Returns 0 if no scan is being handled.
pub fn scan_context() -> u64 {
    SCAN_CONTEXT.with(|v| v.get())
}

/// Clears the scan context for the current thread.
pub fn clear_scan_context() {
    set_scan_context(0);
}

/// Line prefix used by the `eco_*` macros, e.g. `"[scan 3] "`.
#[doc(hidden)]
pub fn context_prefix() -> String {
    match scan_context() {
        0 => String::new(),
        id => format!("[scan {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! eco_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! eco_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! eco_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! eco_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! eco_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_follows_scan_context() {
        assert_eq!(context_prefix(), "");
        set_scan_context(7);
        assert_eq!(context_prefix(), "[scan 7] ");
        clear_scan_context();
        assert_eq!(scan_context(), 0);
    }
}
