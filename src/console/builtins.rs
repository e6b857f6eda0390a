//! Commands that only need the shell itself: `help`, `cls` and `log`.
//!
//! Generic over the dispatch context so they can sit in any registry.

use core::fmt::Write;

use super::error::{ConsoleError, EXIT_FAILURE, EXIT_SUCCESS};
use super::registry::{Call, CommandRegistry};
use crate::log_globals::LOG_FILTER;
use crate::log_sink::{COLOR_GREEN, COLOR_RED, COLOR_RESET};
use crate::logging::{LogCategory, LogFilter};

pub const HELP_HELP: &str = "Print the list of commands, or the help of one command";
pub const HELP_CLS: &str = "Clear the terminal screen";
pub const HELP_LOG: &str = "Enable or disable log categories: log on|off all|CAT..., log show";

/// VT100 clear screen and cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Register `help`, `cls` and `log`.
pub fn register_builtins<C, const N: usize>(registry: &mut CommandRegistry<C, N>) -> Result<(), ConsoleError> {
    registry.register("help", HELP_HELP, Some(help::<C>))?;
    registry.register("cls", HELP_CLS, Some(cls::<C>))?;
    registry.register("log", HELP_LOG, Some(log::<C>))
}

/// `help [name]`
pub fn help<C>(_ctx: &mut C, call: &Call<'_, C>, out: &mut dyn Write) -> u8 {
    match call.args() {
        [] => {
            for command in call.commands {
                let _ = write!(out, "[{}]\r\n{}\r\n\r\n", command.name, command.help);
            }
            EXIT_SUCCESS
        }
        [name] => match call.commands.iter().find(|c| c.name == *name) {
            Some(command) => {
                let _ = write!(out, "[{}]\r\n{}\r\n", command.name, command.help);
                EXIT_SUCCESS
            }
            None => {
                let _ = write!(out, "No help found for command {}.\r\n", name);
                EXIT_FAILURE
            }
        },
        _ => {
            let _ = out.write_str("Command \"help\" takes at most 1 argument.\r\n");
            EXIT_FAILURE
        }
    }
}

/// `cls`
pub fn cls<C>(_ctx: &mut C, call: &Call<'_, C>, out: &mut dyn Write) -> u8 {
    if !call.args().is_empty() {
        let _ = out.write_str("command \"cls\" does not take any argument.\r\n");
        return EXIT_FAILURE;
    }
    let _ = write!(out, "{}{}", COLOR_RESET, CLEAR_SCREEN);
    EXIT_SUCCESS
}

/// `log on|off all|CAT...` and `log show`
pub fn log<C>(_ctx: &mut C, call: &Call<'_, C>, out: &mut dyn Write) -> u8 {
    apply_log_command(&LOG_FILTER, call.args(), out)
}

/// Body of `log`, against any filter.
pub fn apply_log_command(filter: &LogFilter, args: &[&str], out: &mut dyn Write) -> u8 {
    match args {
        ["show", ..] => {
            for category in LogCategory::ALL {
                let (color, state) = if filter.is_enabled(category) {
                    (COLOR_GREEN, "Enabled")
                } else {
                    (COLOR_RED, "Disabled")
                };
                let _ = write!(
                    out,
                    "{:>16}:\t{}{}{}\r\n",
                    category.as_str(),
                    color,
                    state,
                    COLOR_RESET
                );
            }
            EXIT_SUCCESS
        }
        [switch @ ("on" | "off"), targets @ ..] if !targets.is_empty() => {
            let on = *switch == "on";

            if targets.first() == Some(&"all") {
                if on {
                    filter.set_mask(LogFilter::ALL_MASK);
                    let _ = out.write_str("All logs enabled.\r\n");
                } else {
                    filter.set_mask(0);
                    let _ = out.write_str("All logs disabled.\r\n");
                }
                return EXIT_SUCCESS;
            }

            let mut status = EXIT_SUCCESS;
            for name in targets {
                match LogCategory::from_name(name) {
                    Some(category) if on => {
                        filter.enable(category);
                        let _ = write!(out, "LOG enabled for category {}.\r\n", category.as_str());
                    }
                    Some(category) => {
                        filter.disable(category);
                        let _ = write!(out, "LOG disabled for category {}.\r\n", category.as_str());
                    }
                    None => {
                        let _ = write!(out, "Unknown log category {}.\r\n", name);
                        status = EXIT_FAILURE;
                    }
                }
            }
            status
        }
        _ => {
            let _ = out.write_str("usage: log on|off all|CAT..., log show\r\n");
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;

    #[test]
    fn test_log_all_off_then_one_on() {
        let filter = LogFilter::new(LogFilter::DEFAULT_MASK);
        let mut out = String::new();

        assert_eq!(apply_log_command(&filter, &["off", "all"], &mut out), EXIT_SUCCESS);
        assert_eq!(filter.mask(), 0);
        assert!(out.contains("All logs disabled."));

        out.clear();
        assert_eq!(apply_log_command(&filter, &["on", "nvs"], &mut out), EXIT_SUCCESS);
        assert!(filter.is_enabled(LogCategory::Nvs));
        assert!(!filter.is_enabled(LogCategory::Shell));
        assert!(out.contains("LOG enabled for category NVS."));
    }

    #[test]
    fn test_log_rejects_bad_usage() {
        let filter = LogFilter::new(LogFilter::DEFAULT_MASK);
        let mut out = String::new();

        assert_eq!(apply_log_command(&filter, &[], &mut out), EXIT_FAILURE);
        assert_eq!(apply_log_command(&filter, &["on"], &mut out), EXIT_FAILURE);
        assert_eq!(apply_log_command(&filter, &["maybe", "all"], &mut out), EXIT_FAILURE);
        assert_eq!(apply_log_command(&filter, &["on", "bogus"], &mut out), EXIT_FAILURE);
        assert_eq!(filter.mask(), LogFilter::DEFAULT_MASK);
    }

    #[test]
    fn test_log_show_lists_every_category() {
        let filter = LogFilter::new(LogFilter::ALL_MASK);
        let mut out = String::new();

        assert_eq!(apply_log_command(&filter, &["show"], &mut out), EXIT_SUCCESS);
        for category in LogCategory::ALL {
            assert!(out.contains(category.as_str()));
        }
        assert!(!out.contains("Disabled"));
    }
}
