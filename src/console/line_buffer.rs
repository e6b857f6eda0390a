//! Line buffer for console input

use heapless::Vec;

/// Line buffer capacity. A line reaching it is rejected, so the longest
/// command is one byte shorter.
pub const LINE_CAPACITY: usize = 80;

/// Insert refused: the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("line buffer full")]
pub struct CapacityExceeded;

/// Line input buffer with an edit cursor
pub struct LineBuffer {
    buf: Vec<u8, LINE_CAPACITY>,
    cursor: usize,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
        }
    }

    /// Insert a character at the cursor
    pub fn insert(&mut self, c: u8) -> Result<(), CapacityExceeded> {
        self.buf.insert(self.cursor, c).map_err(|_| CapacityExceeded)?;
        self.cursor += 1;
        Ok(())
    }

    /// Remove the character before the cursor
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.buf.remove(self.cursor);
        true
    }

    /// Remove the character under the cursor
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor >= self.buf.len() {
            return false;
        }
        self.buf.remove(self.cursor);
        true
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Replace contents, cursor at the end
    pub fn set(&mut self, s: &str) -> Result<(), CapacityExceeded> {
        self.clear();
        self.buf.extend_from_slice(s.as_bytes()).map_err(|_| CapacityExceeded)?;
        self.cursor = self.buf.len();
        Ok(())
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.is_full()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
