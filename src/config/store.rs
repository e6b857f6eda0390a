//! Versioned, CRC-protected configuration store.
//!
//! Save sequence: erase marker + record pages, write marker, write record.
//! Load accepts the medium contents only if the marker equals
//! [`STORAGE_VERSION`] and the record CRC verifies; otherwise the live record
//! is left exactly as it was.

use super::record::{ConfigRecord, RECORD_SIZE};
use super::{StoreLayout, STORAGE_VERSION};
use crate::logging::LogCategory;
use crate::medium::{self, Medium, MediumError, Page, OP_TIMEOUT_TICKS, PAGE_SIZE};
use crate::{log_error, log_info, log_warn};

/// Shell status for a successful operation.
pub const STATUS_OK: u8 = 0;
/// Shell status for generic failure.
pub const STATUS_ERROR: u8 = 1;
/// Shell status for a medium timeout.
pub const STATUS_TIMEOUT: u8 = 3;
/// Shell status for a CRC mismatch.
pub const STATUS_CRC_FAILED: u8 = 0xFD;
/// Shell status for a version marker mismatch.
pub const STATUS_VERSION_MISMATCH: u8 = 0xFF;

/// Store operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A medium operation did not complete in time.
    #[error("medium operation timed out")]
    Timeout,
    /// Layout points outside the medium.
    #[error("page {0} is outside the medium")]
    PageOutOfRange(u16),
    /// Marker, record and fault pages overlap or leave the medium.
    #[error("invalid store layout")]
    InvalidLayout,
    /// Version marker is not [`STORAGE_VERSION`].
    #[error("storage version mismatch (found 0x{found:08X})")]
    VersionMismatch { found: u32 },
    /// Record checksum does not verify.
    #[error("CRC mismatch (stored 0x{stored:08X}, computed 0x{computed:08X})")]
    CrcMismatch { stored: u32, computed: u32 },
}

impl StoreError {
    /// Numeric status reported by the shell.
    pub fn status(&self) -> u8 {
        match self {
            StoreError::Timeout => STATUS_TIMEOUT,
            StoreError::PageOutOfRange(_) | StoreError::InvalidLayout => STATUS_ERROR,
            StoreError::VersionMismatch { .. } => STATUS_VERSION_MISMATCH,
            StoreError::CrcMismatch { .. } => STATUS_CRC_FAILED,
        }
    }
}

impl From<MediumError> for StoreError {
    fn from(err: MediumError) -> Self {
        match err {
            MediumError::Timeout => StoreError::Timeout,
            MediumError::PageOutOfRange(page) => StoreError::PageOutOfRange(page),
        }
    }
}

/// Status of a store result as seen by the shell.
pub fn status_of(result: &Result<(), StoreError>) -> u8 {
    match result {
        Ok(()) => STATUS_OK,
        Err(e) => e.status(),
    }
}

/// Owner of the live configuration record and of its pages on the medium.
pub struct ConfigStore {
    record: ConfigRecord,
    layout: StoreLayout,
    stored_version: Option<u32>,
}

impl ConfigStore {
    /// Store holding the compiled-in defaults.
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            record: ConfigRecord::defaults(),
            layout,
            stored_version: None,
        }
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Live record, for in-place edits. Edits reach the medium on the next
    /// [`save`](Self::save).
    pub fn record_mut(&mut self) -> &mut ConfigRecord {
        &mut self.record
    }

    /// Version marker seen by the last load, if any load got that far.
    pub fn stored_version(&self) -> Option<u32> {
        self.stored_version
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Replace the live record with the medium contents if they are valid.
    pub fn load<M: Medium + ?Sized>(&mut self, medium: &mut M) -> Result<(), StoreError> {
        let found = self.read_version(medium)?;
        self.stored_version = Some(found);

        if found != STORAGE_VERSION {
            log_warn!(LogCategory::Nvs, "NVS ver = {}, expected {}", found, STORAGE_VERSION);
            return Err(StoreError::VersionMismatch { found });
        }

        let mut scratch = ConfigRecord::from_bytes([0; RECORD_SIZE]);
        self.read_record(medium, &mut scratch)?;

        let stored = scratch.stored_crc();
        let computed = scratch.compute_crc();
        if stored != computed {
            log_warn!(
                LogCategory::Nvs,
                "NVS CRC check failed: 0x{:08X} != 0x{:08X}",
                stored,
                computed
            );
            return Err(StoreError::CrcMismatch { stored, computed });
        }

        self.record = scratch;
        log_info!(LogCategory::Nvs, "NVS loaded, crc 0x{:08X}", computed);
        Ok(())
    }

    /// Persist the live record.
    ///
    /// The marker is written before the record: a save cut short after the
    /// marker reads back as a CRC mismatch, never as a valid stale record.
    pub fn save<M: Medium + ?Sized>(&mut self, medium: &mut M) -> Result<(), StoreError> {
        let crc = self.record.seal();

        medium.erase_page(self.layout.version_page, OP_TIMEOUT_TICKS)?;
        for page in self.layout.data_start..self.layout.data_end() {
            medium.erase_page(page, OP_TIMEOUT_TICKS)?;
        }

        self.write_version(medium)?;
        self.write_record(medium, &self.record)?;

        self.stored_version = Some(STORAGE_VERSION);
        log_info!(LogCategory::Nvs, "NVS saved, crc 0x{:08X}", crc);
        Ok(())
    }

    /// Invalidate the stored record by erasing the version marker.
    ///
    /// The record pages are left as they are; the next load reports a
    /// version mismatch.
    pub fn reset<M: Medium + ?Sized>(&mut self, medium: &mut M) -> Result<(), StoreError> {
        medium.erase_page(self.layout.version_page, OP_TIMEOUT_TICKS)?;
        log_info!(LogCategory::Nvs, "NVS reset");
        Ok(())
    }

    /// Write the live record, read it back and compare.
    ///
    /// `on_diff(offset, written, read)` is called for every byte that came
    /// back different. The store is always reset afterwards, so a tested
    /// medium never presents a record as valid.
    pub fn self_test<M, F>(&mut self, medium: &mut M, mut on_diff: F) -> Result<(), StoreError>
    where
        M: Medium + ?Sized,
        F: FnMut(usize, u8, u8),
    {
        let result = self.write_and_verify(medium, &mut on_diff);
        let reset = self.reset(medium);

        match result {
            Ok(()) => reset,
            Err(e) => {
                log_error!(LogCategory::Nvs, "NVS self-test failed: {}", e);
                Err(e)
            }
        }
    }

    /// Checksum of the whole medium.
    pub fn medium_audit<M: Medium + ?Sized>(&self, medium: &mut M) -> Result<u32, StoreError> {
        Ok(medium::audit(medium)?)
    }

    /// Boot-time load.
    ///
    /// An invalid record is not fatal: defaults stay live and the reason is
    /// returned as `Ok(Some(..))`. A medium failure is returned as `Err`.
    pub fn initialize<M: Medium + ?Sized>(
        &mut self,
        medium: &mut M,
    ) -> Result<Option<StoreError>, StoreError> {
        match self.load(medium) {
            Ok(()) => Ok(None),
            Err(e @ (StoreError::VersionMismatch { .. } | StoreError::CrcMismatch { .. })) => {
                log_warn!(LogCategory::Nvs, "using default configuration");
                Ok(Some(e))
            }
            Err(e) => {
                log_error!(LogCategory::Nvs, "NVS init failed: {}", e);
                Err(e)
            }
        }
    }

    fn write_and_verify<M, F>(&mut self, medium: &mut M, on_diff: &mut F) -> Result<(), StoreError>
    where
        M: Medium + ?Sized,
        F: FnMut(usize, u8, u8),
    {
        let written_crc = self.record.seal();

        for page in self.layout.data_start..self.layout.data_end() {
            medium.erase_page(page, OP_TIMEOUT_TICKS)?;
        }
        self.write_record(medium, &self.record)?;

        let mut readback = ConfigRecord::from_bytes([0; RECORD_SIZE]);
        self.read_record(medium, &mut readback)?;

        for (offset, (&w, &r)) in self
            .record
            .as_bytes()
            .iter()
            .zip(readback.as_bytes().iter())
            .enumerate()
        {
            if w != r {
                on_diff(offset, w, r);
            }
        }

        let read_crc = readback.compute_crc();
        if read_crc != written_crc {
            return Err(StoreError::CrcMismatch {
                stored: written_crc,
                computed: read_crc,
            });
        }
        Ok(())
    }

    fn read_version<M: Medium + ?Sized>(&self, medium: &mut M) -> Result<u32, MediumError> {
        let mut page: Page = [0; PAGE_SIZE];
        medium.read_page(self.layout.version_page, &mut page, OP_TIMEOUT_TICKS)?;
        Ok(u32::from_le_bytes([page[0], page[1], page[2], page[3]]))
    }

    fn write_version<M: Medium + ?Sized>(&self, medium: &mut M) -> Result<(), MediumError> {
        let mut page: Page = [0; PAGE_SIZE];
        page[..4].copy_from_slice(&STORAGE_VERSION.to_le_bytes());
        medium.write_page(self.layout.version_page, &page, OP_TIMEOUT_TICKS)
    }

    fn read_record<M: Medium + ?Sized>(
        &self,
        medium: &mut M,
        into: &mut ConfigRecord,
    ) -> Result<(), MediumError> {
        let mut page: Page = [0; PAGE_SIZE];
        for (i, chunk) in into.as_bytes_mut().chunks_mut(PAGE_SIZE).enumerate() {
            medium.read_page(self.layout.data_start + i as u16, &mut page, OP_TIMEOUT_TICKS)?;
            chunk.copy_from_slice(&page[..chunk.len()]);
        }
        Ok(())
    }

    fn write_record<M: Medium + ?Sized>(
        &self,
        medium: &mut M,
        record: &ConfigRecord,
    ) -> Result<(), MediumError> {
        for (i, chunk) in record.as_bytes().chunks(PAGE_SIZE).enumerate() {
            // Remainder page tail is written as zero
            let mut page: Page = [0; PAGE_SIZE];
            page[..chunk.len()].copy_from_slice(chunk);
            medium.write_page(self.layout.data_start + i as u16, &page, OP_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(StoreLayout::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;

    #[test]
    fn test_blank_medium_is_version_mismatch() {
        let mut m = MemoryMedium::<64>::new();
        let mut store = ConfigStore::default();
        assert_eq!(
            store.load(&mut m),
            Err(StoreError::VersionMismatch { found: 0xFFFF_FFFF })
        );
        assert_eq!(store.stored_version(), Some(0xFFFF_FFFF));
    }

    #[test]
    fn test_save_touches_only_store_pages() {
        let mut m = MemoryMedium::<64>::new();
        let mut store = ConfigStore::default();
        store.save(&mut m).unwrap();

        for page in 0..64u16 {
            let expected = matches!(page, 32..=34);
            assert_eq!(m.write_count(page) > 0, expected, "page {}", page);
        }
        assert_eq!(&m.page(32)[..4], &STORAGE_VERSION.to_le_bytes());
        assert!(m.page(32)[4..].iter().all(|&b| b == 0));
        // Remainder page tail is zero, not erased
        assert!(m.page(34)[RECORD_SIZE - PAGE_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(&Ok(())), 0);
        assert_eq!(StoreError::Timeout.status(), 3);
        assert_eq!(StoreError::VersionMismatch { found: 0 }.status(), 0xFF);
        assert_eq!(StoreError::CrcMismatch { stored: 0, computed: 1 }.status(), 0xFD);
    }

    #[test]
    fn test_initialize_keeps_defaults_on_invalid_record() {
        let mut m = MemoryMedium::<64>::new();
        let mut store = ConfigStore::default();
        let reason = store.initialize(&mut m).unwrap();
        assert!(matches!(reason, Some(StoreError::VersionMismatch { .. })));
        assert_eq!(store.record(), &ConfigRecord::defaults());

        m.fail_after(0);
        assert_eq!(store.initialize(&mut m), Err(StoreError::Timeout));
    }
}
