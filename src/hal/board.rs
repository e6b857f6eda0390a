//! ESP32 board services: version string, heap report, restart.

use core::fmt::{self, Write};

use esp_idf_svc::sys as esp_idf_sys;

use crate::board::{Board, VERSION};

#[derive(Debug, Default)]
pub struct EspBoard {
    reboot_requested: bool,
}

impl EspBoard {
    pub const fn new() -> Self {
        Self {
            reboot_requested: false,
        }
    }

    /// Restart now if a command asked for it. Call between ticks.
    pub fn restart_if_requested(&mut self) {
        if self.reboot_requested {
            unsafe {
                esp_idf_sys::esp_restart();
            }
        }
    }
}

impl Board for EspBoard {
    fn firmware_info(&self) -> &str {
        VERSION
    }

    fn diagnostics(&mut self, out: &mut dyn Write) -> fmt::Result {
        let uptime_us = unsafe { esp_idf_sys::esp_timer_get_time() };
        let free = unsafe { esp_idf_sys::esp_get_free_heap_size() };
        let min = unsafe { esp_idf_sys::esp_get_minimum_free_heap_size() };
        let reset_reason = unsafe { esp_idf_sys::esp_reset_reason() };

        write!(out, "uptime: {} s\r\n", uptime_us / 1_000_000)?;
        write!(out, "heap free: {} bytes (min {})\r\n", free, min)?;
        write!(out, "reset reason: {}\r\n", reset_reason)
    }

    fn request_reboot(&mut self) {
        self.reboot_requested = true;
    }
}
