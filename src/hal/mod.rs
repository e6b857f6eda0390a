//! ESP-IDF side of the controller.
//!
//! Thin wrappers around ESP-IDF services.
//! Business logic stays in core modules, HAL is just I/O.

pub mod board;
pub mod nvs;
pub mod uart;

pub use board::EspBoard;
pub use nvs::NvsMedium;
pub use uart::{init_console_uart, pump_rx, UartConfig, UartWriter};
