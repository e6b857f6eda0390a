//! Module: config
//!
//! Purpose: Non-volatile configuration of the controller.
//!
//! Architecture:
//! - params.rs: Named parameters, their kinds, ranges and compiled-in defaults
//! - record.rs: The flat record image (one 32-bit word per parameter + CRC)
//! - store.rs: Save/load/reset/self-test of the record on the EEPROM
//!
//! Medium layout (pages of 128 bytes):
//!
//! ```text
//! page 32        version marker (first word = STORAGE_VERSION)
//! page 33..35    record: whole pages + remainder page
//! page 48        fault log block
//! ```

pub mod params;
pub mod record;
pub mod store;

pub use params::{find_param, param_names, ParamDescriptor, ParamError, ParamKind, ParamValue, PARAMS, PARAM_COUNT};
pub use record::{ConfigRecord, RECORD_SIZE};
pub use store::{ConfigStore, StoreError};

use crate::medium::PAGE_SIZE;

/// Version word that marks a valid record on the medium.
pub const STORAGE_VERSION: u32 = 3;

/// Where the store and the fault log live on the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLayout {
    /// Page holding the version marker.
    pub version_page: u16,
    /// First page of the record.
    pub data_start: u16,
    /// Page holding the fault log block.
    pub fault_page: u16,
    /// Pages on the whole medium (covered by the audit).
    pub total_pages: u16,
}

impl StoreLayout {
    /// EEPROM layout of the controller: user area starts at page 32.
    pub const DEFAULT: Self = Self {
        version_page: 32,
        data_start: 33,
        fault_page: 48,
        total_pages: 64,
    };

    /// Pages completely filled by the record.
    pub const fn whole_pages() -> u16 {
        (RECORD_SIZE / PAGE_SIZE) as u16
    }

    /// Bytes of the record that spill into a final partial page.
    pub const fn remainder_bytes() -> usize {
        RECORD_SIZE % PAGE_SIZE
    }

    /// Pages occupied by the record, remainder page included.
    pub const fn data_pages(&self) -> u16 {
        Self::whole_pages() + if Self::remainder_bytes() > 0 { 1 } else { 0 }
    }

    /// One past the last record page.
    pub const fn data_end(&self) -> u16 {
        self.data_start + self.data_pages()
    }

    /// Regions are disjoint and inside the medium.
    pub const fn is_valid(&self) -> bool {
        let version_clear = self.version_page < self.data_start || self.version_page >= self.data_end();
        let fault_clear = self.fault_page != self.version_page
            && (self.fault_page < self.data_start || self.fault_page >= self.data_end());
        version_clear
            && fault_clear
            && self.data_end() <= self.total_pages
            && self.fault_page < self.total_pages
            && self.version_page < self.total_pages
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const _: () = assert!(StoreLayout::DEFAULT.is_valid(), "fault page overlaps the record");

/// Shell configuration.
#[derive(Debug, Clone, Copy)]
pub struct ShellConfig {
    /// Secret required before any command runs; `None` disables the lock.
    pub password: Option<&'static str>,
    /// Prompt printed before every line.
    pub prompt: &'static str,
    /// Greeting printed once the shell unlocks.
    pub banner: &'static str,
}

impl ShellConfig {
    /// Password baked in at build time via `CONSOLE_PASSWORD`.
    pub const DEFAULT: Self = Self {
        password: option_env!("CONSOLE_PASSWORD"),
        prompt: "#$ ",
        banner: "eeprom-console, type help for the command list",
    };
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_geometry() {
        let layout = StoreLayout::DEFAULT;
        assert_eq!(RECORD_SIZE, 224);
        assert_eq!(StoreLayout::whole_pages(), 1);
        assert_eq!(StoreLayout::remainder_bytes(), 96);
        assert_eq!(layout.data_pages(), 2);
        assert_eq!(layout.data_end(), 35);
        assert!(layout.is_valid());
    }

    #[test]
    fn test_overlapping_layout_rejected() {
        let layout = StoreLayout { fault_page: 34, ..StoreLayout::DEFAULT };
        assert!(!layout.is_valid());

        let layout = StoreLayout { total_pages: 34, ..StoreLayout::DEFAULT };
        assert!(!layout.is_valid());
    }
}
