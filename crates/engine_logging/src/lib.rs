#![deny(missing_docs)]
//! Shared logging utilities for the grabber workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a thread-local job context that tags every line written from a job thread,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Identifier of the job driven by the current thread, if any.
    static JOB_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Tags all log lines written from the current thread with `job_id`.
///
/// The returned guard restores the previous context when dropped, so a job
/// thread can scope its context to the lifetime of the pipeline.
pub fn enter_job(job_id: u64) -> JobContextGuard {
    let previous = JOB_ID.with(|v| v.replace(Some(job_id)));
    JobContextGuard { previous }
}

/// Returns the job id attached to the current thread, if any.
pub fn current_job() -> Option<u64> {
    JOB_ID.with(|v| v.get())
}

/// Restores the previous job context on drop.
#[must_use = "the job context is cleared as soon as the guard is dropped"]
pub struct JobContextGuard {
    previous: Option<u64>,
}

impl Drop for JobContextGuard {
    fn drop(&mut self) {
        JOB_ID.with(|v| v.set(self.previous));
    }
}

/// Prefix prepended by the `engine_*` macros. Empty outside of a job.
#[doc(hidden)]
pub fn job_prefix() -> String {
    match current_job() {
        Some(id) => format!("[job {id}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
