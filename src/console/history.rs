//! Command history
//!
//! Keeps the most recent distinct committed lines. The recall cursor runs
//! from 0 (the live line) to `len()` (the oldest entry).

use heapless::{HistoryBuf, String};

use super::line_buffer::LINE_CAPACITY;

/// Number of history entries
pub const HISTORY_CAPACITY: usize = 10;

/// Command history ring buffer
pub struct History {
    entries: HistoryBuf<String<LINE_CAPACITY>, HISTORY_CAPACITY>,
    cursor: usize,
}

impl History {
    /// Create empty history
    pub const fn new() -> Self {
        Self {
            entries: HistoryBuf::new(),
            cursor: 0,
        }
    }

    /// Record a committed line.
    ///
    /// Empty lines and repeats of the most recent entry are not recorded.
    /// The recall cursor returns to the live line either way.
    pub fn push(&mut self, line: &str) -> bool {
        self.cursor = 0;

        if line.is_empty() || self.latest() == Some(line) {
            return false;
        }

        let mut entry = String::new();
        for c in line.chars() {
            if entry.push(c).is_err() {
                break;
            }
        }
        self.entries.write(entry);
        true
    }

    /// Step to an older entry. Stays on the oldest once reached.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.len() == 0 {
            return None;
        }
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        self.get(self.cursor)
    }

    /// Step to a newer entry. Stepping past the newest yields the empty
    /// live line; `None` when already on it.
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            0 => None,
            1 => {
                self.cursor = 0;
                Some("")
            }
            _ => {
                self.cursor -= 1;
                self.get(self.cursor)
            }
        }
    }

    /// Entry `n` steps back (1 = most recent).
    pub fn get(&self, n: usize) -> Option<&str> {
        let len = self.entries.len();
        if n == 0 || n > len {
            return None;
        }
        self.entries.oldest_ordered().nth(len - n).map(|s| s.as_str())
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&str> {
        self.entries.recent().map(|s| s.as_str())
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.oldest_ordered().map(|s| s.as_str())
    }

    /// Reset navigation (call when user types)
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
