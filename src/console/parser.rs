//! Command line parser
//!
//! Split on spaces and tabs, at most [`MAX_ARGC`] tokens including the
//! command name.

use heapless::Vec;

/// Maximum tokens per line (command name included).
pub const MAX_ARGC: usize = 8;

/// Tokenized command line
#[derive(Debug, Clone)]
pub struct ParsedLine<'a> {
    /// Token 0 is the command name
    pub argv: Vec<&'a str, MAX_ARGC>,
    /// Tokens beyond [`MAX_ARGC`] were dropped
    pub truncated: bool,
}

impl<'a> ParsedLine<'a> {
    /// The command name (first token)
    pub fn command(&self) -> Option<&'a str> {
        self.argv.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// Parse a command line into tokens
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut argv = Vec::new();
    let mut truncated = false;

    for token in line.split([' ', '\t']).filter(|t| !t.is_empty()) {
        if argv.push(token).is_err() {
            truncated = true;
            break;
        }
    }

    ParsedLine { argv, truncated }
}
