//! Console UART.
//!
//! The RX half is owned by the producer thread, which only pushes bytes into
//! the [`InputQueue`]. The TX half backs the shell's `fmt::Write` output.

use core::fmt;

use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver, UartRxDriver, UartTxDriver};
use esp_idf_svc::sys::EspError;

use crate::queue::InputQueue;

/// UART configuration for the console.
pub struct UartConfig {
    pub baud_rate: u32,
    /// Ticks a single read may wait for data.
    pub read_timeout_ticks: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            read_timeout_ticks: 10,
        }
    }
}

/// Initialize a full-duplex UART and split it into its halves.
pub fn init_console_uart<'d, U: uart::Uart>(
    uart: impl Peripheral<P = U> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
    config: &UartConfig,
) -> Result<(UartTxDriver<'d>, UartRxDriver<'d>), EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    let driver = UartDriver::new(
        uart,
        tx_pin,
        rx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )?;
    Ok(driver.into_split())
}

/// Move received bytes into `queue`.
///
/// Waits at most `timeout_ticks` for the first byte. Bytes the queue
/// rejects are counted by the queue itself. Returns the number read.
pub fn pump_rx<const N: usize>(rx: &UartRxDriver<'_>, queue: &InputQueue<N>, timeout_ticks: u32) -> usize {
    let mut buf = [0u8; 16];
    match rx.read(&mut buf, timeout_ticks) {
        Ok(n) => {
            for &byte in &buf[..n] {
                queue.push(byte);
            }
            n
        }
        Err(_) => 0,
    }
}

/// `fmt::Write` over the TX half.
pub struct UartWriter<'a, 'd> {
    tx: &'a mut UartTxDriver<'d>,
}

impl<'a, 'd> UartWriter<'a, 'd> {
    pub fn new(tx: &'a mut UartTxDriver<'d>) -> Self {
        Self { tx }
    }
}

impl fmt::Write for UartWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.tx.write(bytes).map_err(|_| fmt::Error)?;
            if written == 0 {
                return Err(fmt::Error);
            }
            bytes = &bytes[written..];
        }
        Ok(())
    }
}
