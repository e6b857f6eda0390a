//! Persistent circular fault log.
//!
//! One medium page holds the whole block:
//!
//! ```text
//! offset 0    index   u32   next slot to write
//! offset 4    count   u32   total appends, saturating
//! offset 8    entries [code u16, arg u16] x FAULT_LOG_CAPACITY
//! offset 72   crc     u32   over bytes [0, 72)
//! ```
//!
//! Every append rewrites the page. The in-memory block stays authoritative
//! when the medium misbehaves.

use super::{FaultCode, FaultEntry};
use crate::crc;
use crate::logging::LogCategory;
use crate::medium::{Medium, MediumError, Page, OP_TIMEOUT_TICKS, PAGE_SIZE};
use crate::{log_error, log_info, log_warn};

/// Entries held by the log.
pub const FAULT_LOG_CAPACITY: usize = 16;

const HEADER_SIZE: usize = 8;
const CRC_OFFSET: usize = HEADER_SIZE + FAULT_LOG_CAPACITY * 4;

/// Serialized block size.
pub const BLOCK_SIZE: usize = CRC_OFFSET + 4;

const _: () = assert!(BLOCK_SIZE <= PAGE_SIZE, "fault log block must fit in one page");

/// Fault log contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultLogBlock {
    index: u32,
    count: u32,
    entries: [FaultEntry; FAULT_LOG_CAPACITY],
    crc: u32,
}

impl FaultLogBlock {
    /// Block with no entries and a valid CRC.
    pub fn empty() -> Self {
        let mut block = Self {
            index: 0,
            count: 0,
            entries: [FaultEntry::default(); FAULT_LOG_CAPACITY],
            crc: 0,
        };
        block.crc = block.compute_crc();
        block
    }

    /// Next slot to be written.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Appends since the log was last reset (saturates at `u32::MAX`).
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        (self.count as usize).min(FAULT_LOG_CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Held entries from oldest to newest, with 1-based sequence numbers.
    pub fn iter(&self) -> impl Iterator<Item = (u32, FaultEntry)> + '_ {
        let n = self.len();
        let start = if n < FAULT_LOG_CAPACITY { 0 } else { self.index as usize };
        let first_seq = self.count - n as u32 + 1;

        (0..n).map(move |j| {
            let slot = (start + j) % FAULT_LOG_CAPACITY;
            (first_seq + j as u32, self.entries[slot])
        })
    }

    fn push(&mut self, entry: FaultEntry) {
        self.entries[self.index as usize] = entry;
        self.index = (self.index + 1) % FAULT_LOG_CAPACITY as u32;
        self.count = self.count.saturating_add(1);
        self.crc = self.compute_crc();
    }

    fn write_body(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.index.to_le_bytes());
        buf[4..8].copy_from_slice(&self.count.to_le_bytes());
        for (i, e) in self.entries.iter().enumerate() {
            let off = HEADER_SIZE + i * 4;
            buf[off..off + 2].copy_from_slice(&e.code.to_le_bytes());
            buf[off + 2..off + 4].copy_from_slice(&e.arg.to_le_bytes());
        }
    }

    fn compute_crc(&self) -> u32 {
        let mut body = [0u8; CRC_OFFSET];
        self.write_body(&mut body);
        crc::crc(&body)
    }

    /// Page image: block little-endian, rest of the page zero.
    pub fn to_page(&self) -> Page {
        let mut page = [0u8; PAGE_SIZE];
        self.write_body(&mut page[..CRC_OFFSET]);
        page[CRC_OFFSET..BLOCK_SIZE].copy_from_slice(&self.crc.to_le_bytes());
        page
    }

    /// Decode a page image.
    ///
    /// Returns `None` if the CRC does not verify or the index is out of range.
    pub fn from_page(page: &Page) -> Option<Self> {
        let word = |off: usize| u32::from_le_bytes([page[off], page[off + 1], page[off + 2], page[off + 3]]);
        let half = |off: usize| u16::from_le_bytes([page[off], page[off + 1]]);

        let stored = word(CRC_OFFSET);
        if crc::crc(&page[..CRC_OFFSET]) != stored {
            return None;
        }

        let index = word(0);
        if index as usize >= FAULT_LOG_CAPACITY {
            return None;
        }

        let mut entries = [FaultEntry::default(); FAULT_LOG_CAPACITY];
        for (i, e) in entries.iter_mut().enumerate() {
            let off = HEADER_SIZE + i * 4;
            *e = FaultEntry {
                code: half(off),
                arg: half(off + 2),
            };
        }

        Some(Self {
            index,
            count: word(4),
            entries,
            crc: stored,
        })
    }
}

impl Default for FaultLogBlock {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fault log bound to its medium page.
pub struct FaultLog {
    block: FaultLogBlock,
    page: u16,
}

impl FaultLog {
    /// Empty log stored on `page`.
    pub fn new(page: u16) -> Self {
        Self {
            block: FaultLogBlock::empty(),
            page,
        }
    }

    /// Adopt the block stored on the medium.
    ///
    /// A corrupt block (blank medium included) is replaced by an empty one
    /// holding a single [`FaultCode::LogCorrupt`] entry. If the page cannot
    /// be read the in-memory block is kept and nothing is written.
    pub fn init<M: Medium + ?Sized>(&mut self, medium: &mut M) -> &FaultLogBlock {
        let mut page = [0u8; PAGE_SIZE];

        match medium.read_page(self.page, &mut page, OP_TIMEOUT_TICKS) {
            Ok(()) => match FaultLogBlock::from_page(&page) {
                Some(block) => {
                    log_info!(LogCategory::Fault, "fault log: {} entries, count {}", block.len(), block.count);
                    self.block = block;
                }
                None => {
                    log_warn!(LogCategory::Fault, "fault log corrupt, resetting");
                    self.block = FaultLogBlock::empty();
                    let _ = self.append(FaultCode::LogCorrupt as u16, 0, medium);
                }
            },
            Err(e) => {
                log_error!(LogCategory::Fault, "fault log read failed: {}", e);
            }
        }

        &self.block
    }

    /// Record a fault and persist the block.
    ///
    /// The entry is kept in memory even if the medium write fails.
    pub fn append<M: Medium + ?Sized>(&mut self, code: u16, arg: u16, medium: &mut M) -> Result<(), MediumError> {
        self.block.push(FaultEntry { code, arg });
        self.persist(medium).map_err(|e| {
            log_error!(LogCategory::Fault, "fault log write failed: {}", e);
            e
        })
    }

    /// Record a known fault.
    pub fn record<M: Medium + ?Sized>(&mut self, code: FaultCode, arg: u16, medium: &mut M) -> Result<(), MediumError> {
        log_warn!(LogCategory::Fault, "fault 0x{:04X} {} (0x{:04X})", code as u16, code.as_str(), arg);
        self.append(code as u16, arg, medium)
    }

    fn persist<M: Medium + ?Sized>(&self, medium: &mut M) -> Result<(), MediumError> {
        let page = self.block.to_page();
        medium.erase_page(self.page, OP_TIMEOUT_TICKS)?;
        medium.write_page(self.page, &page, OP_TIMEOUT_TICKS)
    }

    pub fn block(&self) -> &FaultLogBlock {
        &self.block
    }

    pub fn page(&self) -> u16 {
        self.page
    }

    /// Held entries from oldest to newest, with 1-based sequence numbers.
    pub fn iter(&self) -> impl Iterator<Item = (u32, FaultEntry)> + '_ {
        self.block.iter()
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn count(&self) -> u32 {
        self.block.count()
    }
}
