//! Foreground loop: input queue to editor to dispatcher, then log drain.

use core::fmt::Write;

use crate::board::Board;
use crate::config::{ShellConfig, StoreError, StoreLayout};
use crate::console::{register_builtins, register_commands, CommandRegistry, DispatchOutcome, LineEditor, PollSummary};
use crate::controller::{Controller, Mode};
use crate::fault::FaultCode;
use crate::log_sink;
use crate::logging::LogCategory;
use crate::medium::Medium;
use crate::queue::InputQueue;
use crate::{log_debug, log_warn};

/// Controller plus shell.
pub struct App<M: Medium, B: Board> {
    controller: Controller<M, B>,
    editor: LineEditor,
    registry: CommandRegistry<Controller<M, B>>,
    /// Registration hit the table capacity; recorded at boot.
    registry_full: bool,
}

impl<M: Medium, B: Board> App<M, B> {
    pub fn new(medium: M, board: B, config: ShellConfig) -> Self {
        Self::build(Controller::new(medium, board), config)
    }

    /// Shell on a custom layout, see [`Controller::with_layout`].
    pub fn with_layout(medium: M, board: B, layout: StoreLayout, config: ShellConfig) -> Result<Self, StoreError> {
        Ok(Self::build(Controller::with_layout(medium, board, layout)?, config))
    }

    /// Build the registry. A full command table is recorded as a fault at
    /// boot; commands registered before it stay usable.
    fn build(controller: Controller<M, B>, config: ShellConfig) -> Self {
        let mut registry: CommandRegistry<Controller<M, B>> = CommandRegistry::new();

        let registered = register_builtins(&mut registry).and_then(|()| register_commands(&mut registry));

        let mut editor = LineEditor::new(config);
        editor.set_completions(registry.names());

        Self {
            controller,
            editor,
            registry,
            registry_full: registered.is_err(),
        }
    }

    /// Fault log first, then configuration. See [`Controller::boot`].
    pub fn boot(&mut self) -> Mode {
        let mode = self.controller.boot();
        if self.registry_full {
            self.controller
                .record_fault(FaultCode::CommandTableFull, self.registry.len() as u16);
        }
        mode
    }

    /// One pass of the foreground loop.
    ///
    /// Consumes every queued byte, runs committed lines, turns input
    /// overruns into fault entries and drains pending log entries to `out`.
    pub fn tick<const N: usize>(&mut self, queue: &InputQueue<N>, out: &mut dyn Write) -> PollSummary {
        let Self {
            controller,
            editor,
            registry,
            ..
        } = self;

        let summary = editor.poll(queue, out, |line, out| {
            let outcome = registry.dispatch(line, controller, out);
            if let Some(err) = outcome.error() {
                log_debug!(LogCategory::Shell, "{}", err);
            }
            if let DispatchOutcome::Completed { status } = outcome {
                log_debug!(LogCategory::Shell, "\"{}\" returned {}", line, status);
            }
        });

        if summary.overflowed {
            controller.record_fault(FaultCode::LineOverflow, 0);
        }

        let dropped = queue.take_dropped();
        if dropped > 0 {
            log_warn!(LogCategory::Queue, "input queue dropped {} bytes", dropped);
            controller.record_fault(FaultCode::QueueOverflow, dropped.min(u16::MAX as u32) as u16);
        }

        log_sink::drain(out);
        summary
    }

    pub fn controller(&self) -> &Controller<M, B> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<M, B> {
        &mut self.controller
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn registry(&self) -> &CommandRegistry<Controller<M, B>> {
        &self.registry
    }

    /// Give back the medium and the board (simulated reboot).
    pub fn into_parts(self) -> (M, B) {
        self.controller.into_parts()
    }
}
