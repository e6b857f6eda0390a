//! CRC-32 checksum engine for persisted structures.
//!
//! Polynomial 0x04C11DB7, initial register 0xFFFF_FFFF, no bit reflection,
//! processed MSB-first through a 256-entry table. The register is stepped
//! without any XOR so partial results compose across buffers and pages;
//! [`Crc32::finalize`] and [`crc`] return the CRC-32/BZIP2 value
//! (register complemented), which is what gets stored and reported.

use ::crc::{Crc, CRC_32_BZIP2};

/// Generator polynomial (MSB-first form).
pub const POLYNOMIAL: u32 = 0x04C1_1DB7;

/// Register value before the first byte.
pub const INITIAL: u32 = 0xFFFF_FFFF;

/// One-shot engine used for whole-buffer checksums.
const BZIP2: Crc<u32> = Crc::<u32>::new(&CRC_32_BZIP2);

/// Lookup table, generated at compile time.
pub const TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 0x8000_0000 != 0 {
                (c << 1) ^ POLYNOMIAL
            } else {
                c << 1
            };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Advance the CRC register by one byte.
#[inline]
pub const fn step(prev: u32, byte: u8) -> u32 {
    (prev << 8) ^ TABLE[(((prev >> 24) ^ byte as u32) & 0xFF) as usize]
}

/// CRC-32/BZIP2 of `bytes`.
#[inline]
pub fn crc(bytes: &[u8]) -> u32 {
    BZIP2.checksum(bytes)
}

/// Running checksum for data that arrives in pieces (pages, records).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crc32 {
    register: u32,
}

impl Crc32 {
    pub const fn new() -> Self {
        Self { register: INITIAL }
    }

    /// Fold `bytes` into the register.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.register = step(self.register, b);
        }
    }

    /// Raw register, before the final complement.
    #[inline]
    pub const fn register(&self) -> u32 {
        self.register
    }

    /// Finished checksum, equal to [`crc`] over everything folded so far.
    #[inline]
    pub const fn finalize(&self) -> u32 {
        !self.register
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc(b"123456789"), 0xFC89_1918);
    }

    #[test]
    fn test_table_matches_reference_entries() {
        assert_eq!(TABLE[0], 0x0000_0000);
        assert_eq!(TABLE[1], 0x04C1_1DB7);
        assert_eq!(TABLE[2], 0x0982_3B6E);
        assert_eq!(TABLE[255], 0xB1F7_40B4);
    }

    #[test]
    fn test_running_matches_one_shot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut running = Crc32::new();
        running.update(&data[..10]);
        running.update(&data[10..]);
        assert_eq!(running.finalize(), crc(data));
    }

    #[test]
    fn test_step_has_no_final_xor() {
        let register = b"123456789".iter().fold(INITIAL, |c, &b| step(c, b));
        // CRC-32/MPEG-2 check value: same register, no output XOR
        assert_eq!(register, 0x0376_E6E7);
        assert_eq!(!register, crc(b"123456789"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Crc32::new().register(), INITIAL);
        assert_eq!(crc(&[]), 0);
    }
}
