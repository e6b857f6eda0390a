//! Console error types

/// Status returned by a handler that succeeded.
pub const EXIT_SUCCESS: u8 = 0;
/// Generic failure, wrong argument count.
pub const EXIT_FAILURE: u8 = 1;
/// Argument could not be parsed.
pub const EXIT_PARSE_ERROR: u8 = 2;
/// Refused because the controller is in fail-stop.
pub const EXIT_FAIL_STOP: u8 = 0xFE;

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// E01: Unknown command
    #[error("E01: unknown command")]
    UnknownCommand,
    /// E02: Command registered without a handler
    #[error("E02: no function associated")]
    HandlerMissing,
    /// E03: Command table is full
    #[error("E03: command table full")]
    CommandTableFull,
    /// E04: Input line too long
    #[error("E04: line too long")]
    LineOverflow,
    /// E05: Wrong number of arguments
    #[error("E05: wrong number of arguments")]
    ArgumentCount,
    /// E06: Invalid value format
    #[error("E06: invalid value")]
    ArgumentParse,
    /// E07: Value out of allowed range
    #[error("E07: out of range")]
    OutOfRange,
    /// E08: Controller is in fail-stop
    #[error("E08: refused in fail-stop")]
    FailStop,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::HandlerMissing => "E02",
            Self::CommandTableFull => "E03",
            Self::LineOverflow => "E04",
            Self::ArgumentCount => "E05",
            Self::ArgumentParse => "E06",
            Self::OutOfRange => "E07",
            Self::FailStop => "E08",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::HandlerMissing => "no function associated",
            Self::CommandTableFull => "command table full",
            Self::LineOverflow => "line too long",
            Self::ArgumentCount => "wrong number of arguments",
            Self::ArgumentParse => "invalid value",
            Self::OutOfRange => "out of range",
            Self::FailStop => "refused in fail-stop",
        }
    }

    /// Handler exit status for this error.
    pub fn status(&self) -> u8 {
        match self {
            Self::ArgumentParse | Self::OutOfRange => EXIT_PARSE_ERROR,
            Self::FailStop => EXIT_FAIL_STOP,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<crate::config::ParamError> for ConsoleError {
    fn from(err: crate::config::ParamError) -> Self {
        match err {
            crate::config::ParamError::Parse => Self::ArgumentParse,
            crate::config::ParamError::OutOfRange => Self::OutOfRange,
        }
    }
}
