//! Non-blocking logging.
//!
//! ```text
//! any context            LogStream            foreground loop
//! ───────────            ─────────            ───────────────
//!
//! log_info!() ────────▶ [L0][L1][L2] ──────▶ log_sink::drain(out)
//! non-blocking            lock-free            terminal output
//! ```
//!
//! # Rules
//!
//! - Producers never block: when the ring is full the message is dropped
//!   and counted.
//! - Every message carries a [`LogCategory`]; the global filter decides
//!   which categories are recorded. Errors and warnings always pass.
//! - Output formatting happens only in the drain, never at the call site.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Subsystem a message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LogCategory {
    Shell = 0,
    Nvs = 1,
    Fault = 2,
    Queue = 3,
}

impl LogCategory {
    /// All categories, in display order.
    pub const ALL: [LogCategory; 4] = [
        LogCategory::Shell,
        LogCategory::Nvs,
        LogCategory::Fault,
        LogCategory::Queue,
    ];

    /// Filter mask bit.
    pub const fn bit(self) -> u32 {
        1 << self as u8
    }

    /// Tag printed in front of every message.
    pub fn as_str(self) -> &'static str {
        match self {
            LogCategory::Shell => "SHELL",
            LogCategory::Nvs => "NVS",
            LogCategory::Fault => "FAULT",
            LogCategory::Queue => "QUEUE",
        }
    }

    /// Parse a tag as typed on the console (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Originating subsystem.
    pub category: LogCategory,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        level: LogLevel::Info,
        category: LogCategory::Shell,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log stream (multiple producers, multiple consumers).
///
/// Each slot carries a sequence word that says whose turn it is. The word
/// is stored relative to the slot index so that an all-zero array is the
/// valid empty state:
///
/// - `seq == pos - slot`: free for the producer claiming `pos`
/// - `seq == pos + 1 - slot`: filled, readable by the consumer at `pos`
///
/// Push never blocks (drops message if full).
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    seq: [AtomicU32; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: A slot is only touched by the thread that won the CAS on
// write_idx (or read_idx) for it, and ownership is handed over through the
// slot's sequence word with Release/Acquire.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        #[allow(clippy::declare_interior_mutable_const)]
        const FREE: AtomicU32 = AtomicU32::new(0);

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            seq: [FREE; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    pub fn push(&self, level: LogLevel, category: LogCategory, msg: &[u8]) -> bool {
        let mut pos = self.write_idx.load(Ordering::Relaxed);

        loop {
            let slot = (pos as usize) & Self::MASK;
            let seq = self.seq[slot].load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos.wrapping_sub(slot as u32)) as i32;

            if diff == 0 {
                match self.write_idx.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS made this thread the only owner of `slot`
                        unsafe {
                            let entry = &mut (*self.entries.get())[slot];
                            entry.level = level;
                            entry.category = category;
                            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
                            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
                        }
                        self.seq[slot].store(
                            pos.wrapping_add(1).wrapping_sub(slot as u32),
                            Ordering::Release,
                        );
                        return true;
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                // Slot still holds an undrained entry from the previous lap
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            } else {
                pos = self.write_idx.load(Ordering::Relaxed);
            }
        }
    }

    /// Take the oldest entry.
    ///
    /// Returns `None` if no entries available.
    pub fn drain(&self) -> Option<LogEntry> {
        let mut pos = self.read_idx.load(Ordering::Relaxed);

        loop {
            let slot = (pos as usize) & Self::MASK;
            let seq = self.seq[slot].load(Ordering::Acquire);
            let filled = pos.wrapping_add(1).wrapping_sub(slot as u32);
            let diff = seq.wrapping_sub(filled) as i32;

            if diff == 0 {
                match self.read_idx.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS made this thread the only reader of `slot`
                        let entry = unsafe { (*self.entries.get())[slot] };
                        self.seq[slot].store(
                            pos.wrapping_add(N as u32).wrapping_sub(slot as u32),
                            Ordering::Release,
                        );
                        return Some(entry);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.read_idx.load(Ordering::Relaxed);
            }
        }
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Get number of entries waiting to be drained (approximate while
    /// producers are active).
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Category filter, shared by every producer.
pub struct LogFilter {
    mask: AtomicU32,
}

impl LogFilter {
    /// Everything but the noisy queue category.
    pub const DEFAULT_MASK: u32 =
        LogCategory::Shell.bit() | LogCategory::Nvs.bit() | LogCategory::Fault.bit();

    /// Mask with every category set.
    pub const ALL_MASK: u32 = (1 << LogCategory::ALL.len()) - 1;

    pub const fn new(mask: u32) -> Self {
        Self {
            mask: AtomicU32::new(mask),
        }
    }

    /// Whether a message would be recorded.
    #[inline]
    pub fn allows(&self, level: LogLevel, category: LogCategory) -> bool {
        level <= LogLevel::Warn || self.is_enabled(category)
    }

    #[inline]
    pub fn is_enabled(&self, category: LogCategory) -> bool {
        self.mask.load(Ordering::Relaxed) & category.bit() != 0
    }

    pub fn enable(&self, category: LogCategory) {
        self.mask.fetch_or(category.bit(), Ordering::Relaxed);
    }

    pub fn disable(&self, category: LogCategory) {
        self.mask.fetch_and(!category.bit(), Ordering::Relaxed);
    }

    pub fn set_mask(&self, mask: u32) {
        self.mask.store(mask & Self::ALL_MASK, Ordering::Relaxed);
    }

    pub fn mask(&self) -> u32 {
        self.mask.load(Ordering::Relaxed)
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MASK)
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Log macro: record a message on the global stream if the filter allows it.
///
/// # Example
///
/// ```ignore
/// log_at!(LogLevel::Info, LogCategory::Nvs, "NVS ver = {}", version);
/// ```
#[macro_export]
macro_rules! log_at {
    ($level:expr, $category:expr, $($arg:tt)*) => {{
        let level = $level;
        let category = $category;
        if $crate::log_globals::LOG_FILTER.allows(level, category) {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $crate::log_globals::LOG_STREAM.push(level, category, &buf[..len]);
        }
    }};
}

/// Error log (never filtered).
#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Error, $category, $($arg)*)
    };
}

/// Warning log (never filtered).
#[macro_export]
macro_rules! log_warn {
    ($category:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Warn, $category, $($arg)*)
    };
}

/// Info log.
#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Info, $category, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Debug, $category, $($arg)*)
    };
}
