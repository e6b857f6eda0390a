//! Parser tests for console command line parsing

use eeprom_console::console::parser::{parse_line, MAX_ARGC};

#[test]
fn test_parse_simple_command() {
    let line = parse_line("help");
    assert_eq!(line.command(), Some("help"));
    assert_eq!(line.argv.len(), 1);
}

#[test]
fn test_parse_command_with_args() {
    let line = parse_line("nvs_set kp_0 2.5");
    assert_eq!(line.command(), Some("nvs_set"));
    assert_eq!(&line.argv[..], ["nvs_set", "kp_0", "2.5"]);
    assert!(!line.truncated);
}

#[test]
fn test_parse_trims_whitespace_and_tabs() {
    let line = parse_line("  log \t on   nvs  ");
    assert_eq!(&line.argv[..], ["log", "on", "nvs"]);
}

#[test]
fn test_parse_empty_line() {
    assert!(parse_line("").is_empty());
    assert!(parse_line(" \t ").is_empty());
    assert_eq!(parse_line("").command(), None);
}

#[test]
fn test_parse_max_args() {
    let line = parse_line("foo 1 2 3 4 5 6 7 8 9");
    assert_eq!(line.argv.len(), MAX_ARGC);
    assert_eq!(line.argv[MAX_ARGC - 1], "7");
    // "8" and "9" are dropped
    assert!(line.truncated);
}
