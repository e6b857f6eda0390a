//! Fault codes and fault log entries.
//!
//! # Philosophy
//!
//! > A controller running on a configuration it cannot trust is worse than
//! > a stopped one. If in doubt, record the fault and refuse to change state.
//!
//! Every anomaly the firmware detects is appended to the persistent
//! [`FaultLog`](log::FaultLog) so it survives a reboot.

pub mod log;

pub use self::log::{FaultLog, FaultLogBlock, FAULT_LOG_CAPACITY};

use core::fmt;

/// Fault codes recorded in the fault log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum FaultCode {
    /// The fault log block itself failed its CRC and was reset.
    /// Reserved: written only by the fault log.
    LogCorrupt = 0x0001,

    /// Configuration version marker did not match at boot.
    /// Argument: low 16 bits of the marker found.
    ConfigVersion = 0x0002,

    /// Configuration record CRC did not verify at boot.
    /// Argument: low 16 bits of the stored CRC.
    ConfigCrc = 0x0003,

    /// The medium stopped responding.
    /// Argument: page being accessed, when known.
    MediumTimeout = 0x0004,

    /// Initialization failed; the controller entered fail-stop.
    InitFailed = 0x0005,

    /// Input bytes were dropped because the input queue was full.
    /// Argument: number of dropped bytes (saturated).
    QueueOverflow = 0x0006,

    /// An input line exceeded the line buffer.
    LineOverflow = 0x0007,

    /// A command could not be registered.
    CommandTableFull = 0x0008,
}

impl FaultCode {
    /// Convert from raw u16 value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(FaultCode::LogCorrupt),
            0x0002 => Some(FaultCode::ConfigVersion),
            0x0003 => Some(FaultCode::ConfigCrc),
            0x0004 => Some(FaultCode::MediumTimeout),
            0x0005 => Some(FaultCode::InitFailed),
            0x0006 => Some(FaultCode::QueueOverflow),
            0x0007 => Some(FaultCode::LineOverflow),
            0x0008 => Some(FaultCode::CommandTableFull),
            _ => None,
        }
    }

    /// Short name for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::LogCorrupt => "log corrupt",
            FaultCode::ConfigVersion => "config version",
            FaultCode::ConfigCrc => "config crc",
            FaultCode::MediumTimeout => "medium timeout",
            FaultCode::InitFailed => "init failed",
            FaultCode::QueueOverflow => "queue overflow",
            FaultCode::LineOverflow => "line overflow",
            FaultCode::CommandTableFull => "command table full",
        }
    }
}

/// One fault log slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultEntry {
    pub code: u16,
    pub arg: u16,
}

impl FaultEntry {
    pub const fn new(code: FaultCode, arg: u16) -> Self {
        Self {
            code: code as u16,
            arg,
        }
    }

    /// Known code, `None` for codes written by other firmware versions.
    pub fn fault_code(&self) -> Option<FaultCode> {
        FaultCode::from_u16(self.code)
    }
}

impl fmt::Display for FaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X} (0x{:04X})", self.code, self.arg)?;
        if let Some(code) = self.fault_code() {
            write!(f, " {}", code.as_str())?;
        }
        Ok(())
    }
}
