//! # eeprom-console
//!
//! CRC-protected configuration store, persistent fault log and service shell
//! for a small controller.
//!
//! ## Architecture
//!
//! - [`medium`]: page-erasable persistent memory behind the [`Medium`] trait
//! - [`config`]: versioned, CRC-sealed parameter record ([`ConfigStore`])
//! - [`fault`]: fixed-capacity ring of fault entries kept on its own page
//! - [`queue`]: SPSC byte queue between the transport and the shell
//! - [`console`]: line editor, history, command registry and handlers
//! - [`controller`]: owns medium, store and fault log; fail-stop policy
//! - [`app`]: the foreground loop tying the pieces together
//!
//! Everything runs in one cooperative foreground loop. The only concurrent
//! actor is the byte producer, which touches nothing but [`InputQueue::push`].

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod board;
pub mod config;
pub mod console;
pub mod controller;
pub mod crc;
pub mod fault;
pub mod log_globals;
pub mod log_sink;
pub mod logging;
pub mod medium;
pub mod queue;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use app::App;
pub use board::{Board, HostBoard};
pub use config::{ConfigRecord, ConfigStore, ShellConfig, StoreError, StoreLayout};
pub use controller::{ControlError, Controller, Mode};
pub use fault::{FaultCode, FaultEntry, FaultLog};
pub use log_globals::{LOG_FILTER, LOG_STREAM};
pub use medium::{Medium, MediumError, MemoryMedium};
pub use queue::InputQueue;
