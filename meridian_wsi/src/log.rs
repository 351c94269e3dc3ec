//! Internal logging system for the Meridian WSI subsystem
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - Thread-safe logging with RwLock
//! - File and line information for detailed ERROR logs

use colored::*;
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to create custom loggers (file logging, in-process
/// capture for tests, etc.)
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "meridian::wsi", "meridian::vulkan")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information (typically disabled in release)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        // Format timestamp as YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== GLOBAL LOGGER =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Replace the global logger
///
/// All subsequent log output from the WSI goes through the new logger.
pub fn set_logger(new_logger: Box<dyn Logger>) {
    if let Ok(mut slot) = logger().write() {
        *slot = new_logger;
    }
}

/// Log a message through the global logger (used by the `wsi_*!` macros)
pub fn log(severity: LogSeverity, source: &str, message: String) {
    log_detailed(severity, source, message, None, None);
}

/// Log a message with optional file:line detail (used by `wsi_error!`)
pub fn log_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: Option<&'static str>,
    line: Option<u32>,
) {
    let entry = LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file,
        line,
    };
    if let Ok(slot) = logger().read() {
        slot.log(&entry);
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
#[macro_export]
macro_rules! wsi_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Trace, $source, format!($($arg)*))
    };
}

/// Log a DEBUG message (development information)
#[macro_export]
macro_rules! wsi_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Debug, $source, format!($($arg)*))
    };
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! wsi_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Info, $source, format!($($arg)*))
    };
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! wsi_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Warn, $source, format!($($arg)*))
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! wsi_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            Some(file!()),
            Some(line!()),
        )
    };
}

/// Log an ERROR message and produce a `crate::Error::BackendError`
///
/// Use where an error value is needed inline:
/// `.ok_or_else(|| wsi_err!("meridian::wsi", "no chain"))`
#[macro_export]
macro_rules! wsi_err {
    ($source:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            msg.clone(),
            Some(file!()),
            Some(line!()),
        );
        $crate::error::Error::BackendError(msg)
    }};
}

/// Log an ERROR message and return early with `Err(BackendError)`
#[macro_export]
macro_rules! wsi_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::wsi_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
