//! Terminal output of log entries.
//!
//! Format: `[CAT]: message\r\n`, colored by level with VT100 escapes.
//! Runs in the foreground loop; producers never wait on it.

use core::fmt::{self, Write};

use crate::log_globals::LOG_STREAM;
use crate::logging::{LogEntry, LogLevel, LogStream};

pub const COLOR_RED: &str = "\x1b[31m";
pub const COLOR_GREEN: &str = "\x1b[32m";
pub const COLOR_YELLOW: &str = "\x1b[33m";
pub const COLOR_GREY: &str = "\x1b[90m";
pub const COLOR_RESET: &str = "\x1b[0m";

fn level_color(level: LogLevel) -> Option<&'static str> {
    match level {
        LogLevel::Error => Some(COLOR_RED),
        LogLevel::Warn => Some(COLOR_YELLOW),
        LogLevel::Info => None,
        LogLevel::Debug => Some(COLOR_GREY),
    }
}

/// Write one entry.
pub fn format_log_entry(entry: &LogEntry, out: &mut dyn Write) -> fmt::Result {
    match level_color(entry.level) {
        Some(color) => write!(
            out,
            "{}[{}]: {}{}\r\n",
            color,
            entry.category.as_str(),
            entry.message(),
            COLOR_RESET
        ),
        None => write!(out, "[{}]: {}\r\n", entry.category.as_str(), entry.message()),
    }
}

/// Write every pending entry of `stream`, then a drop report if messages
/// were lost since the last drain.
///
/// Returns the number of entries written.
pub fn drain_stream<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut written = 0;

    while let Some(entry) = stream.drain() {
        let _ = format_log_entry(&entry, out);
        written += 1;
    }

    let dropped = stream.take_dropped();
    if dropped > 0 {
        let _ = write!(out, "{}[LOG]: {} messages dropped{}\r\n", COLOR_YELLOW, dropped, COLOR_RESET);
    }

    written
}

/// Drain the global stream.
pub fn drain(out: &mut dyn Write) -> usize {
    drain_stream(&LOG_STREAM, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogCategory;

    #[test]
    fn test_format_log_entry() {
        let stream = LogStream::<4>::new();
        stream.push(LogLevel::Info, LogCategory::Nvs, b"NVS ver = 3");

        let mut out = String::new();
        assert_eq!(drain_stream(&stream, &mut out), 1);
        assert_eq!(out, "[NVS]: NVS ver = 3\r\n");
    }

    #[test]
    fn test_error_colored() {
        let stream = LogStream::<4>::new();
        stream.push(LogLevel::Error, LogCategory::Fault, b"boom");

        let mut out = String::new();
        drain_stream(&stream, &mut out);
        assert!(out.starts_with(COLOR_RED));
        assert!(out.contains("[FAULT]: boom"));
        assert!(out.ends_with("\r\n"));
    }

    #[test]
    fn test_drop_report() {
        let stream = LogStream::<2>::new();
        for _ in 0..5 {
            stream.push(LogLevel::Info, LogCategory::Shell, b"x");
        }

        let mut out = String::new();
        assert_eq!(drain_stream(&stream, &mut out), 2);
        assert!(out.contains("3 messages dropped"));

        // Counter was consumed
        let mut out = String::new();
        drain_stream(&stream, &mut out);
        assert!(out.is_empty());
    }
}
