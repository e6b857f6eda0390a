//! Page medium emulated on top of the ESP-IDF NVS partition.
//!
//! Every page is one blob under the key `pgNNN`. A missing blob reads as an
//! erased page, so erasing is removing the key. Programming keeps EEPROM
//! semantics: the new data is ANDed into the current contents.

use core::fmt::Write;

use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;
use heapless::String;

use crate::log_error;
use crate::logging::LogCategory;
use crate::medium::{Medium, MediumError, Page, ERASED_BYTE, PAGE_SIZE};

/// NVS namespace holding the page blobs
pub const NVS_NAMESPACE: &str = "eeprom";

pub struct NvsMedium {
    nvs: EspNvs<NvsDefault>,
    pages: u16,
}

impl NvsMedium {
    /// Open (or create) the namespace on the default partition.
    pub fn new(partition: EspDefaultNvsPartition, pages: u16) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs, pages })
    }

    fn check(&self, page: u16) -> Result<String<8>, MediumError> {
        if page >= self.pages {
            return Err(MediumError::PageOutOfRange(page));
        }
        let mut key = String::new();
        let _ = write!(key, "pg{:03}", page);
        Ok(key)
    }
}

/// Any NVS failure is reported as an unresponsive medium.
fn unavailable(op: &str, page: u16, err: EspError) -> MediumError {
    log_error!(LogCategory::Nvs, "NVS {} page {} failed: {}", op, page, err);
    MediumError::Timeout
}

impl Medium for NvsMedium {
    fn page_count(&self) -> u16 {
        self.pages
    }

    fn read_page(&mut self, page: u16, buf: &mut Page, _timeout_ticks: u32) -> Result<(), MediumError> {
        let key = self.check(page)?;
        let len = self
            .nvs
            .get_blob(&key, &mut buf[..])
            .map_err(|e| unavailable("read", page, e))?
            .map(|data| data.len());

        if len != Some(PAGE_SIZE) {
            buf.fill(ERASED_BYTE);
        }
        Ok(())
    }

    fn erase_page(&mut self, page: u16, _timeout_ticks: u32) -> Result<(), MediumError> {
        let key = self.check(page)?;
        self.nvs
            .remove(&key)
            .map_err(|e| unavailable("erase", page, e))?;
        Ok(())
    }

    fn write_page(&mut self, page: u16, data: &Page, timeout_ticks: u32) -> Result<(), MediumError> {
        let mut cells = [ERASED_BYTE; PAGE_SIZE];
        self.read_page(page, &mut cells, timeout_ticks)?;
        for (cell, &byte) in cells.iter_mut().zip(data.iter()) {
            *cell &= byte;
        }

        let key = self.check(page)?;
        self.nvs
            .set_blob(&key, &cells)
            .map_err(|e| unavailable("write", page, e))
    }
}
