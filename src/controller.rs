//! Controller: owns the medium, the configuration store and the fault log.
//!
//! # Fail-stop
//!
//! If the medium does not answer at boot the controller enters
//! [`Mode::FailStop`]. It keeps serving the shell and the fault log but
//! refuses every operation that would change stored state. Only a reboot
//! leaves fail-stop.

use crate::board::Board;
use crate::config::{ConfigStore, StoreError, StoreLayout};
use crate::fault::{FaultCode, FaultLog};
use crate::logging::LogCategory;
use crate::medium::Medium;
use crate::{log_error, log_info, log_warn};

/// Shell status for an operation refused in fail-stop.
pub const STATUS_FAIL_STOP: u8 = 0xFE;

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Running,
    /// Terminal state entered when initialization failed.
    FailStop { reason: StoreError },
}

/// Failure of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("refused: controller is in fail-stop")]
    FailStop,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ControlError {
    /// Numeric status reported by the shell.
    pub fn status(&self) -> u8 {
        match self {
            ControlError::FailStop => STATUS_FAIL_STOP,
            ControlError::Store(e) => e.status(),
        }
    }
}

pub struct Controller<M: Medium, B: Board> {
    store: ConfigStore,
    faults: FaultLog,
    medium: M,
    board: B,
    mode: Mode,
}

impl<M: Medium, B: Board> Controller<M, B> {
    /// Controller on the default layout.
    pub fn new(medium: M, board: B) -> Self {
        Self::from_layout(medium, board, StoreLayout::DEFAULT)
    }

    /// Controller on a custom layout. Overlapping regions, or regions
    /// outside the medium, are rejected.
    pub fn with_layout(medium: M, board: B, layout: StoreLayout) -> Result<Self, StoreError> {
        if !layout.is_valid() || layout.total_pages > medium.page_count() {
            log_error!(LogCategory::Nvs, "rejected layout {:?}", layout);
            return Err(StoreError::InvalidLayout);
        }
        Ok(Self::from_layout(medium, board, layout))
    }

    fn from_layout(medium: M, board: B, layout: StoreLayout) -> Self {
        Self {
            store: ConfigStore::new(layout),
            faults: FaultLog::new(layout.fault_page),
            medium,
            board,
            mode: Mode::Running,
        }
    }

    /// Bring up the fault log, then the configuration.
    ///
    /// An invalid record is recorded as a fault and defaults stay live. A
    /// medium that does not answer puts the controller in fail-stop.
    pub fn boot(&mut self) -> Mode {
        self.faults.init(&mut self.medium);

        match self.store.initialize(&mut self.medium) {
            Ok(None) => {}
            Ok(Some(StoreError::VersionMismatch { found })) => {
                // Blank or reset marker is the normal first-boot state
                if found != u32::MAX {
                    self.record_fault(FaultCode::ConfigVersion, found as u16);
                }
            }
            Ok(Some(StoreError::CrcMismatch { stored, .. })) => {
                self.record_fault(FaultCode::ConfigCrc, stored as u16);
            }
            Ok(Some(other)) | Err(other) => {
                if other == StoreError::Timeout {
                    self.record_fault(FaultCode::MediumTimeout, 0);
                }
                self.record_fault(FaultCode::InitFailed, other.status() as u16);
                self.fail_stop(other);
            }
        }

        if self.mode == Mode::Running {
            log_info!(LogCategory::Nvs, "controller ready");
        }
        self.mode
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_fail_stop(&self) -> bool {
        matches!(self.mode, Mode::FailStop { .. })
    }

    /// Enter fail-stop (never left until reboot).
    pub fn fail_stop(&mut self, reason: StoreError) {
        if !self.is_fail_stop() {
            log_error!(LogCategory::Fault, "entering fail-stop: {}", reason);
            self.mode = Mode::FailStop { reason };
        }
    }

    /// Append to the fault log. A failed write is logged, never fatal.
    pub fn record_fault(&mut self, code: FaultCode, arg: u16) {
        let _ = self.faults.record(code, arg, &mut self.medium);
    }

    pub fn save_config(&mut self) -> Result<(), ControlError> {
        self.ensure_running()?;
        let result = self.store.save(&mut self.medium);
        self.note(result)
    }

    pub fn load_config(&mut self) -> Result<(), ControlError> {
        self.ensure_running()?;
        let result = self.store.load(&mut self.medium);
        self.note(result)
    }

    pub fn reset_config(&mut self) -> Result<(), ControlError> {
        self.ensure_running()?;
        let result = self.store.reset(&mut self.medium);
        self.note(result)
    }

    /// Store self-test, see [`ConfigStore::self_test`].
    pub fn test_config<F: FnMut(usize, u8, u8)>(&mut self, on_diff: F) -> Result<(), ControlError> {
        self.ensure_running()?;
        let result = self.store.self_test(&mut self.medium, on_diff);
        self.note(result)
    }

    /// Checksum of the whole medium. Allowed in fail-stop.
    pub fn audit(&mut self) -> Result<u32, StoreError> {
        self.store.medium_audit(&mut self.medium)
    }

    /// Refuse state changes in fail-stop.
    pub fn ensure_running(&self) -> Result<(), ControlError> {
        if self.is_fail_stop() {
            log_warn!(LogCategory::Shell, "refused: fail-stop");
            return Err(ControlError::FailStop);
        }
        Ok(())
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Give back the medium and the board (simulated reboot).
    pub fn into_parts(self) -> (M, B) {
        (self.medium, self.board)
    }

    fn note(&mut self, result: Result<(), StoreError>) -> Result<(), ControlError> {
        if let Err(StoreError::Timeout) = result {
            self.record_fault(FaultCode::MediumTimeout, 0);
        }
        result.map_err(ControlError::from)
    }
}
