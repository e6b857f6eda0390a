//! Global log stream and filter.
//!
//! The only process-wide state of the crate: every component logs through
//! these, the foreground loop drains them.

use crate::logging::{LogFilter, LogStream};

/// Log stream shared by every context.
pub static LOG_STREAM: LogStream = LogStream::new();

/// Categories currently recorded (changed by the `log` command).
pub static LOG_FILTER: LogFilter = LogFilter::new(LogFilter::DEFAULT_MASK);
