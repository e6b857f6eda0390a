//! Page-granular persistent medium.
//!
//! The medium is addressed in pages of [`PAGE_WORDS`] 32-bit words. A page
//! must be erased (all ones) before it is programmed; programming can only
//! clear bits. Every operation is bounded by a timeout and reports
//! [`MediumError::Timeout`] instead of hanging.

pub mod memory;

pub use memory::MemoryMedium;

use crate::crc::Crc32;

/// Words per page.
pub const PAGE_WORDS: usize = 32;

/// Bytes per page.
pub const PAGE_SIZE: usize = PAGE_WORDS * 4;

/// Value of every byte of an erased page.
pub const ERASED_BYTE: u8 = 0xFF;

/// Bound applied to every medium operation, in adapter ticks.
pub const OP_TIMEOUT_TICKS: u32 = 100_000;

/// One page worth of bytes.
pub type Page = [u8; PAGE_SIZE];

/// Medium operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MediumError {
    /// The operation did not complete within its bound.
    #[error("medium operation timed out")]
    Timeout,
    /// Page index beyond the end of the medium.
    #[error("page {0} is outside the medium")]
    PageOutOfRange(u16),
}

/// Raw medium access (external collaborator contract).
pub trait Medium {
    /// Number of pages on the medium.
    fn page_count(&self) -> u16;

    /// Read a whole page.
    fn read_page(&mut self, page: u16, buf: &mut Page, timeout_ticks: u32) -> Result<(), MediumError>;

    /// Erase a page to the blank (all ones) state.
    fn erase_page(&mut self, page: u16, timeout_ticks: u32) -> Result<(), MediumError>;

    /// Program a previously erased page.
    fn write_page(&mut self, page: u16, data: &Page, timeout_ticks: u32) -> Result<(), MediumError>;
}

impl<M: Medium + ?Sized> Medium for &mut M {
    fn page_count(&self) -> u16 {
        (**self).page_count()
    }

    fn read_page(&mut self, page: u16, buf: &mut Page, timeout_ticks: u32) -> Result<(), MediumError> {
        (**self).read_page(page, buf, timeout_ticks)
    }

    fn erase_page(&mut self, page: u16, timeout_ticks: u32) -> Result<(), MediumError> {
        (**self).erase_page(page, timeout_ticks)
    }

    fn write_page(&mut self, page: u16, data: &Page, timeout_ticks: u32) -> Result<(), MediumError> {
        (**self).write_page(page, data, timeout_ticks)
    }
}

/// Fold every byte of every page of the medium into one checksum.
///
/// Independent of any record's own CRC; used as a coarse health signal.
pub fn audit<M: Medium + ?Sized>(medium: &mut M) -> Result<u32, MediumError> {
    let mut crc = Crc32::new();
    let mut buf = [0u8; PAGE_SIZE];

    for page in 0..medium.page_count() {
        medium.read_page(page, &mut buf, OP_TIMEOUT_TICKS)?;
        crc.update(&buf);
    }

    Ok(crc.finalize())
}
