//! Service shell.
//!
//! Polled from the foreground loop, no dedicated task.
//! Zero heap allocation: all buffers are fixed-capacity.

pub mod builtins;
pub mod commands;
pub mod completion;
pub mod editor;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;
pub mod registry;

pub use builtins::register_builtins;
pub use commands::register_commands;
pub use completion::Completer;
pub use editor::{EditorEvent, EditorState, LineEditor, PollSummary};
pub use error::{ConsoleError, EXIT_FAILURE, EXIT_FAIL_STOP, EXIT_PARSE_ERROR, EXIT_SUCCESS};
pub use history::History;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedLine, MAX_ARGC};
pub use registry::{Call, Command, CommandRegistry, DispatchOutcome, Handler, MAX_COMMANDS};
