//! RAM-backed medium.
//!
//! Behaves like the EEPROM array: starts blank, erase sets a page to all
//! ones, programming ANDs the new data into the cell (so writing without a
//! prior erase produces garbage instead of the intended bytes).
//!
//! Fault injection for tests and the host simulator:
//! - [`MemoryMedium::fail_after`]: operations start timing out
//! - [`MemoryMedium::tear_after_writes`]: later writes are lost (power cut)
//! - [`MemoryMedium::flip_bit`] / [`MemoryMedium::poke_word`]: corrupt cells

use super::{Medium, MediumError, Page, ERASED_BYTE, PAGE_SIZE};

/// In-memory medium of `PAGES` pages.
pub struct MemoryMedium<const PAGES: usize = 64> {
    pages: [Page; PAGES],
    erase_counts: [u32; PAGES],
    write_counts: [u32; PAGES],
    /// Operations left before every call times out.
    ops_until_timeout: Option<u32>,
    /// Writes left before further writes are silently dropped.
    writes_until_tear: Option<u32>,
}

impl<const PAGES: usize> MemoryMedium<PAGES> {
    /// Create a blank medium.
    pub const fn new() -> Self {
        assert!(PAGES <= u16::MAX as usize, "page index must fit in u16");

        Self {
            pages: [[ERASED_BYTE; PAGE_SIZE]; PAGES],
            erase_counts: [0; PAGES],
            write_counts: [0; PAGES],
            ops_until_timeout: None,
            writes_until_tear: None,
        }
    }

    /// Let `ops` more operations succeed, then time out every operation.
    pub fn fail_after(&mut self, ops: u32) {
        self.ops_until_timeout = Some(ops);
    }

    /// Let `writes` more page writes land, then drop the rest silently.
    pub fn tear_after_writes(&mut self, writes: u32) {
        self.writes_until_tear = Some(writes);
    }

    /// Clear injected failures.
    pub fn heal(&mut self) {
        self.ops_until_timeout = None;
        self.writes_until_tear = None;
    }

    /// Raw page contents.
    pub fn page(&self, page: u16) -> &Page {
        &self.pages[page as usize]
    }

    /// Flip one bit of one byte.
    pub fn flip_bit(&mut self, page: u16, offset: usize, bit: u8) {
        self.pages[page as usize][offset] ^= 1 << (bit & 7);
    }

    /// Overwrite bytes directly, bypassing the erase rule.
    pub fn poke(&mut self, page: u16, offset: usize, bytes: &[u8]) {
        self.pages[page as usize][offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Overwrite one little-endian word at byte `offset`.
    pub fn poke_word(&mut self, page: u16, offset: usize, value: u32) {
        self.poke(page, offset, &value.to_le_bytes());
    }

    /// Number of times `page` was erased.
    pub fn erase_count(&self, page: u16) -> u32 {
        self.erase_counts[page as usize]
    }

    /// Number of times `page` was programmed.
    pub fn write_count(&self, page: u16) -> u32 {
        self.write_counts[page as usize]
    }

    /// Total writes across the medium.
    pub fn total_writes(&self) -> u32 {
        self.write_counts.iter().sum()
    }

    fn begin(&mut self, page: u16) -> Result<usize, MediumError> {
        if let Some(left) = self.ops_until_timeout.as_mut() {
            if *left == 0 {
                return Err(MediumError::Timeout);
            }
            *left -= 1;
        }

        let idx = page as usize;
        if idx >= PAGES {
            return Err(MediumError::PageOutOfRange(page));
        }
        Ok(idx)
    }
}

impl<const PAGES: usize> Default for MemoryMedium<PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PAGES: usize> Medium for MemoryMedium<PAGES> {
    fn page_count(&self) -> u16 {
        PAGES as u16
    }

    fn read_page(&mut self, page: u16, buf: &mut Page, _timeout_ticks: u32) -> Result<(), MediumError> {
        let idx = self.begin(page)?;
        buf.copy_from_slice(&self.pages[idx]);
        Ok(())
    }

    fn erase_page(&mut self, page: u16, _timeout_ticks: u32) -> Result<(), MediumError> {
        let idx = self.begin(page)?;
        self.pages[idx] = [ERASED_BYTE; PAGE_SIZE];
        self.erase_counts[idx] += 1;
        Ok(())
    }

    fn write_page(&mut self, page: u16, data: &Page, _timeout_ticks: u32) -> Result<(), MediumError> {
        let idx = self.begin(page)?;

        if let Some(left) = self.writes_until_tear.as_mut() {
            if *left == 0 {
                // Power is gone: the caller believes the write happened
                return Ok(());
            }
            *left -= 1;
        }

        for (cell, &byte) in self.pages[idx].iter_mut().zip(data.iter()) {
            *cell &= byte;
        }
        self.write_counts[idx] += 1;
        Ok(())
    }
}
