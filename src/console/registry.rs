//! Command table and dispatcher.
//!
//! Commands are registered once at startup and never removed. Handlers are
//! plain function pointers that receive the shared context `C` (the
//! controller), the tokenized call and the terminal.

use core::fmt::Write;

use heapless::Vec;

use super::error::{ConsoleError, EXIT_SUCCESS};
use super::parser::{parse_line, MAX_ARGC};
use crate::log_sink::{COLOR_GREEN, COLOR_RED, COLOR_RESET};
use crate::logging::LogCategory;
use crate::{log_error, log_warn};

/// Registry capacity.
pub const MAX_COMMANDS: usize = 32;

/// Command handler: returns the exit status.
pub type Handler<C> = fn(&mut C, &Call<'_, C>, &mut dyn Write) -> u8;

/// One registered command.
pub struct Command<C> {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Option<Handler<C>>,
}

impl<C> Clone for Command<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Command<C> {}

/// Arguments of one invocation.
pub struct Call<'a, C> {
    /// Token 0 is the command name.
    pub argv: &'a [&'a str],
    /// Every registered command, for `help`.
    pub commands: &'a [Command<C>],
}

impl<'a, C> Call<'a, C> {
    /// Token count, command name included.
    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    pub fn name(&self) -> &'a str {
        self.argv.first().copied().unwrap_or("")
    }

    /// Argument `i` (0 is the first argument after the name).
    pub fn arg(&self, i: usize) -> Option<&'a str> {
        self.argv.get(i + 1).copied()
    }

    /// Arguments after the name.
    pub fn args(&self) -> &'a [&'a str] {
        self.argv.get(1..).unwrap_or(&[])
    }
}

/// Result of dispatching one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Blank line.
    Empty,
    /// Handler ran and returned `status`.
    Completed { status: u8 },
    /// Name registered without a handler.
    HandlerMissing,
    /// Name not registered.
    Unknown,
}

impl DispatchOutcome {
    pub fn error(&self) -> Option<ConsoleError> {
        match self {
            DispatchOutcome::HandlerMissing => Some(ConsoleError::HandlerMissing),
            DispatchOutcome::Unknown => Some(ConsoleError::UnknownCommand),
            _ => None,
        }
    }
}

/// Append-only command table.
pub struct CommandRegistry<C, const N: usize = MAX_COMMANDS> {
    commands: Vec<Command<C>, N>,
}

impl<C, const N: usize> CommandRegistry<C, N> {
    pub const fn new() -> Self {
        Self { commands: Vec::new() }
    }

    /// Add a command. A full table is reported and leaves the table as is.
    pub fn register(
        &mut self,
        name: &'static str,
        help: &'static str,
        handler: Option<Handler<C>>,
    ) -> Result<(), ConsoleError> {
        self.commands
            .push(Command { name, help, handler })
            .map_err(|_| {
                log_error!(LogCategory::Shell, "cannot register \"{}\": command table full", name);
                ConsoleError::CommandTableFull
            })
    }

    /// First command registered under exactly `name`.
    pub fn find(&self, name: &str) -> Option<&Command<C>> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + Clone + '_ {
        self.commands.iter().map(|c| c.name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Tokenize `line`, look the command up and run it.
    pub fn dispatch(&self, line: &str, ctx: &mut C, out: &mut dyn Write) -> DispatchOutcome {
        let parsed = parse_line(line);
        let Some(name) = parsed.command() else {
            return DispatchOutcome::Empty;
        };

        if parsed.truncated {
            log_warn!(
                LogCategory::Shell,
                "maximum number of arguments is {}, ignoring the rest",
                MAX_ARGC - 1
            );
            let _ = write!(
                out,
                "maximum number of arguments is {}, ignoring the rest\r\n",
                MAX_ARGC - 1
            );
        }

        let Some(command) = self.find(name) else {
            let _ = write!(out, "command \"{}\" unknown, try: help\r\n", name);
            return DispatchOutcome::Unknown;
        };

        let Some(handler) = command.handler else {
            let _ = write!(
                out,
                "command \"{}\" exists but no function is associated to it\r\n",
                name
            );
            return DispatchOutcome::HandlerMissing;
        };

        let call = Call {
            argv: &parsed.argv,
            commands: &self.commands,
        };
        let status = handler(ctx, &call, out);

        let color = if status == EXIT_SUCCESS { COLOR_GREEN } else { COLOR_RED };
        let _ = write!(out, "\r\n{}({} returned {}){}\r\n", color, name, status, COLOR_RESET);

        DispatchOutcome::Completed { status }
    }
}

impl<C, const N: usize> Default for CommandRegistry<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
