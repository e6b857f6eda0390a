//! Interactive line editor.
//!
//! Turns the raw byte stream into committed lines: echo, backspace, history
//! recall, tab completion, the optional password gate and the line length
//! limit. Output goes to any `core::fmt::Write`; all VT100 handling stays in
//! this module.

use core::fmt::Write;

use heapless::{String, Vec};

use super::completion::Completer;
use super::error::ConsoleError;
use super::history::History;
use super::line_buffer::{LineBuffer, LINE_CAPACITY};
use super::registry::MAX_COMMANDS;
use crate::config::{param_names, ShellConfig};
use crate::log_sink::{COLOR_RED, COLOR_RESET};
use crate::logging::LogCategory;
use crate::queue::InputQueue;
use crate::{log_info, log_warn};

/// Prompt shown while the shell is locked.
pub const PASSWORD_PROMPT: &str = "password: ";

const ERASE_CHAR: &str = "\x08 \x08";

/// Editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Locked: input is compared with the password, never echoed.
    AwaitingPassword,
    /// Collecting a command line.
    Editing,
    /// A committed line is being handled.
    Dispatching,
}

/// Something the caller has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// A non-empty line was committed; read it with [`LineEditor::committed`].
    Line,
    /// The line reached the buffer capacity and was discarded.
    Overflow,
    /// Ctrl+C abandoned the line.
    Cancelled,
    /// Correct password entered.
    Unlocked,
    /// Wrong password entered.
    Denied,
}

/// What one [`LineEditor::poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Bytes taken from the queue.
    pub bytes: usize,
    /// Lines handed to the line handler.
    pub lines: usize,
    /// Polling stopped on a line overflow.
    pub overflowed: bool,
}

#[derive(Clone, Copy)]
enum Key {
    Up,
    Down,
    Right,
    Left,
    Delete,
}

const SEQUENCES: [(&[u8], Key); 5] = [
    (b"\x1b[A", Key::Up),
    (b"\x1b[B", Key::Down),
    (b"\x1b[C", Key::Right),
    (b"\x1b[D", Key::Left),
    (b"\x1b[3~", Key::Delete),
];

/// Line editor state machine
pub struct LineEditor {
    config: ShellConfig,
    state: EditorState,
    line: LineBuffer,
    committed: String<LINE_CAPACITY>,
    history: History,
    completer: Completer,
    commands: Vec<&'static str, MAX_COMMANDS>,
    /// Escape sequence collected so far (starts with ESC)
    escape: Vec<u8, 4>,
    last_was_cr: bool,
    started: bool,
}

impl LineEditor {
    /// Editor locked behind `config.password` when one is set.
    pub fn new(config: ShellConfig) -> Self {
        let state = if config.password.is_some() {
            EditorState::AwaitingPassword
        } else {
            EditorState::Editing
        };

        Self {
            config,
            state,
            line: LineBuffer::new(),
            committed: String::new(),
            history: History::new(),
            completer: Completer::new(),
            commands: Vec::new(),
            escape: Vec::new(),
            last_was_cr: false,
            started: false,
        }
    }

    /// Command names offered by Tab.
    pub fn set_completions<I: IntoIterator<Item = &'static str>>(&mut self, names: I) {
        self.commands.clear();
        for name in names {
            if self.commands.push(name).is_err() {
                break;
            }
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Line being edited.
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    /// Last committed line.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Print the greeting or the password prompt, once.
    pub fn start(&mut self, out: &mut dyn Write) {
        if self.started {
            return;
        }
        self.started = true;

        match self.state {
            EditorState::AwaitingPassword => {
                let _ = out.write_str(PASSWORD_PROMPT);
            }
            _ => self.greet(out),
        }
    }

    /// Drain `queue`, handing every committed line to `on_line`.
    ///
    /// Stops early after a line overflow so the remaining bytes of the
    /// oversized line start a fresh one on the next poll.
    pub fn poll<const N: usize, F>(&mut self, queue: &InputQueue<N>, out: &mut dyn Write, mut on_line: F) -> PollSummary
    where
        F: FnMut(&str, &mut dyn Write),
    {
        self.start(out);
        let mut summary = PollSummary::default();

        while let Some(byte) = queue.pop() {
            summary.bytes += 1;
            match self.feed(byte, out) {
                Some(EditorEvent::Line) => {
                    self.state = EditorState::Dispatching;
                    on_line(self.committed.as_str(), out);
                    self.state = EditorState::Editing;
                    summary.lines += 1;
                    self.print_prompt(out);
                }
                Some(EditorEvent::Overflow) => {
                    summary.overflowed = true;
                    break;
                }
                _ => {}
            }
        }

        summary
    }

    /// Process a single input byte.
    ///
    /// On [`EditorEvent::Line`] the prompt is not printed; the caller prints
    /// it with [`print_prompt`](Self::print_prompt) after handling the line.
    pub fn feed(&mut self, byte: u8, out: &mut dyn Write) -> Option<EditorEvent> {
        if !self.escape.is_empty() {
            return self.feed_escape(byte, out);
        }

        let after_cr = core::mem::replace(&mut self.last_was_cr, byte == b'\r');

        match byte {
            // Enter; the LF of a CR LF pair is swallowed
            b'\r' => self.commit(out),
            b'\n' if after_cr => None,
            b'\n' => self.commit(out),

            // Backspace
            0x08 | 0x7F => {
                if self.line.delete_before_cursor() && self.echoes() {
                    let _ = out.write_str(ERASE_CHAR);
                }
                self.completer.reset();
                self.history.reset_cursor();
                None
            }

            // Escape
            0x1B => {
                let _ = self.escape.push(byte);
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = out.write_str("^C\r\n");
                self.line.clear();
                self.completer.reset();
                self.history.reset_cursor();
                self.print_prompt(out);
                Some(EditorEvent::Cancelled)
            }

            // Ctrl+U (clear line)
            0x15 => {
                if self.echoes() {
                    for _ in 0..self.line.len() {
                        let _ = out.write_str(ERASE_CHAR);
                    }
                }
                self.line.clear();
                self.completer.reset();
                None
            }

            // Tab
            b'\t' => {
                if self.state == EditorState::Editing {
                    return self.handle_tab(out);
                }
                None
            }

            // Printable character
            0x20..=0x7E => {
                if self.line.insert(byte).is_err() || self.line.is_full() {
                    return Some(self.overflow(out));
                }
                if self.echoes() {
                    let _ = out.write_char(byte as char);
                }
                self.completer.reset();
                self.history.reset_cursor();
                None
            }

            _ => None,
        }
    }

    /// Print the prompt for the current state.
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let prompt = match self.state {
            EditorState::AwaitingPassword => PASSWORD_PROMPT,
            _ => self.config.prompt,
        };
        let _ = out.write_str(prompt);
    }

    fn echoes(&self) -> bool {
        self.state != EditorState::AwaitingPassword
    }

    fn greet(&self, out: &mut dyn Write) {
        let _ = write!(out, "\r\n{}\r\n", self.config.banner);
        self.print_prompt(out);
    }

    fn commit(&mut self, out: &mut dyn Write) -> Option<EditorEvent> {
        let _ = out.write_str("\r\n");
        self.completer.reset();

        if self.state == EditorState::AwaitingPassword {
            let accepted = self.config.password.map_or(true, |p| p == self.line.as_str());
            self.line.clear();

            return if accepted {
                self.state = EditorState::Editing;
                log_info!(LogCategory::Shell, "shell unlocked");
                self.greet(out);
                Some(EditorEvent::Unlocked)
            } else {
                log_warn!(LogCategory::Shell, "wrong password");
                let _ = out.write_str("access denied\r\n");
                self.print_prompt(out);
                Some(EditorEvent::Denied)
            };
        }

        if self.line.is_empty() {
            self.history.reset_cursor();
            self.print_prompt(out);
            return None;
        }

        self.committed.clear();
        let _ = self.committed.push_str(self.line.as_str());
        self.history.push(self.committed.as_str());
        self.line.clear();
        Some(EditorEvent::Line)
    }

    fn overflow(&mut self, out: &mut dyn Write) -> EditorEvent {
        let _ = write!(
            out,
            "\r\n{}max command length is {}{}\r\n",
            COLOR_RED,
            LINE_CAPACITY - 1,
            COLOR_RESET
        );
        log_warn!(LogCategory::Shell, "{}", ConsoleError::LineOverflow);
        self.line.clear();
        self.completer.reset();
        self.history.reset_cursor();
        self.print_prompt(out);
        EditorEvent::Overflow
    }

    /// Collect one byte of an escape sequence.
    ///
    /// An unknown CSI sequence (`ESC [ x`) is discarded whole. A byte that
    /// follows a lone ESC, or any control byte, is not part of a sequence
    /// and goes back through [`feed`](Self::feed).
    fn feed_escape(&mut self, byte: u8, out: &mut dyn Write) -> Option<EditorEvent> {
        let lone_esc = self.escape.len() == 1;
        if self.escape.push(byte).is_err() {
            self.escape.clear();
            return None;
        }

        if let Some(&(_, key)) = SEQUENCES.iter().find(|(seq, _)| *seq == self.escape.as_slice()) {
            self.escape.clear();
            if self.state == EditorState::Editing {
                self.apply_key(key, out);
            }
            return None;
        }

        if SEQUENCES.iter().any(|(seq, _)| seq.starts_with(self.escape.as_slice())) {
            return None;
        }

        self.escape.clear();
        if lone_esc || byte < 0x20 || byte == 0x7F {
            return self.feed(byte, out);
        }
        None
    }

    fn apply_key(&mut self, key: Key, out: &mut dyn Write) {
        self.completer.reset();

        let recalled = match key {
            Key::Up => self.history.older(),
            Key::Down => self.history.newer(),
            Key::Delete => {
                self.line.delete_at_cursor();
                None
            }
            Key::Left | Key::Right => None,
        };

        if let Some(text) = recalled {
            Self::replace_line(&mut self.line, text, out);
        }
    }

    fn replace_line(line: &mut LineBuffer, new_line: &str, out: &mut dyn Write) {
        // Clear displayed line
        for _ in 0..line.len() {
            let _ = out.write_str(ERASE_CHAR);
        }

        let _ = line.set(new_line);
        let _ = out.write_str(line.as_str());
    }

    /// Replace the word before the cursor with the next completion. The
    /// completed line obeys the same length limit as typed input.
    fn handle_tab(&mut self, out: &mut dyn Write) -> Option<EditorEvent> {
        let (prefix_len, completion) = {
            let input = self.line.as_str();
            let last_word_start = input.rfind(' ').map(|i| i + 1).unwrap_or(0);
            let prefix = &input[last_word_start..];

            let completion = if last_word_start == 0 {
                // Complete command (first word)
                self.completer.complete(prefix, self.commands.iter().copied())
            } else {
                // Complete parameter (after command)
                self.completer.complete(prefix, param_names())
            };
            (prefix.len(), completion)
        };

        let completed = completion?;

        // Clear current word and replace with completion
        for _ in 0..prefix_len {
            self.line.delete_before_cursor();
            let _ = out.write_str(ERASE_CHAR);
        }

        for c in completed.bytes() {
            if self.line.insert(c).is_err() || self.line.is_full() {
                return Some(self.overflow(out));
            }
            let _ = out.write_char(c as char);
        }
        None
    }
}
