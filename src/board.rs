//! Platform services the shell needs beyond the medium.
//!
//! Business logic stays in core modules; a board is just I/O.

use core::fmt::{self, Write};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Platform collaborator.
pub trait Board {
    /// Build/version string printed by `info`.
    fn firmware_info(&self) -> &str;

    /// Platform snapshot printed by `dbg_report`.
    fn diagnostics(&mut self, out: &mut dyn Write) -> fmt::Result;

    /// Ask for a reboot. Takes effect after the current command returns.
    fn request_reboot(&mut self);
}

/// Board used by the host simulator and the tests.
#[derive(Debug, Default)]
pub struct HostBoard {
    reboot_requested: bool,
    diagnostics_calls: u32,
}

impl HostBoard {
    pub const fn new() -> Self {
        Self {
            reboot_requested: false,
            diagnostics_calls: 0,
        }
    }

    pub fn reboot_requested(&self) -> bool {
        self.reboot_requested
    }

    /// Clear the reboot request (the simulator "reboots" in place).
    pub fn take_reboot_request(&mut self) -> bool {
        core::mem::take(&mut self.reboot_requested)
    }
}

impl Board for HostBoard {
    fn firmware_info(&self) -> &str {
        VERSION
    }

    fn diagnostics(&mut self, out: &mut dyn Write) -> fmt::Result {
        self.diagnostics_calls += 1;
        write!(out, "platform: host simulator\r\n")?;
        write!(out, "reports: {}\r\n", self.diagnostics_calls)
    }

    fn request_reboot(&mut self) {
        self.reboot_requested = true;
    }
}
