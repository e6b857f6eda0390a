//! Flat configuration record.
//!
//! ```text
//! offset 0            word 0 (PARAMS[0])
//! ...
//! offset 4*(N-1)      word N-1
//! offset 4*N          CRC-32 of bytes [0, 4*N)
//! ```
//!
//! All words little-endian. The CRC is the last field and never covers
//! itself.

use super::params::{ParamValue, PARAMS, PARAM_COUNT};
use crate::crc;

/// Bytes covered by the CRC.
pub const PAYLOAD_SIZE: usize = PARAM_COUNT * 4;

/// Total record size, CRC included.
pub const RECORD_SIZE: usize = PAYLOAD_SIZE + 4;

/// In-memory image of the persisted record.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    bytes: [u8; RECORD_SIZE],
}

impl ConfigRecord {
    /// Record filled with the compiled-in defaults, CRC sealed.
    pub fn defaults() -> Self {
        let mut record = Self::from_bytes([0; RECORD_SIZE]);
        for (i, p) in PARAMS.iter().enumerate() {
            record.set_word(i, p.default.to_word());
        }
        record.seal();
        record
    }

    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; RECORD_SIZE] {
        &mut self.bytes
    }

    /// Raw parameter word.
    pub fn word(&self, index: usize) -> u32 {
        let off = index * 4;
        u32::from_le_bytes([
            self.bytes[off],
            self.bytes[off + 1],
            self.bytes[off + 2],
            self.bytes[off + 3],
        ])
    }

    /// Overwrite a raw parameter word. Does not touch the CRC.
    pub fn set_word(&mut self, index: usize, word: u32) {
        let off = index * 4;
        self.bytes[off..off + 4].copy_from_slice(&word.to_le_bytes());
    }

    /// Decoded parameter value.
    pub fn get(&self, index: usize) -> ParamValue {
        PARAMS[index].kind.decode(self.word(index))
    }

    /// Store a parameter value. Does not touch the CRC.
    pub fn set(&mut self, index: usize, value: ParamValue) {
        self.set_word(index, value.to_word());
    }

    /// CRC field as stored in the record.
    pub fn stored_crc(&self) -> u32 {
        u32::from_le_bytes([
            self.bytes[PAYLOAD_SIZE],
            self.bytes[PAYLOAD_SIZE + 1],
            self.bytes[PAYLOAD_SIZE + 2],
            self.bytes[PAYLOAD_SIZE + 3],
        ])
    }

    /// CRC of the payload as it is now.
    pub fn compute_crc(&self) -> u32 {
        crc::crc(&self.bytes[..PAYLOAD_SIZE])
    }

    /// Recompute the CRC and store it in the record.
    pub fn seal(&mut self) -> u32 {
        let crc = self.compute_crc();
        self.bytes[PAYLOAD_SIZE..].copy_from_slice(&crc.to_le_bytes());
        crc
    }

    /// Stored CRC matches the payload.
    pub fn is_sealed(&self) -> bool {
        self.stored_crc() == self.compute_crc()
    }
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

impl core::fmt::Debug for ConfigRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConfigRecord")
            .field("crc", &format_args!("0x{:08X}", self.stored_crc()))
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
