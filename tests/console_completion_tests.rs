//! Tab completion tests

use eeprom_console::console::completion::Completer;

// Mock completions for testing
static TEST_COMMANDS: &[&str] = &["help", "nvs_dump", "nvs_get", "nvs_load", "nvs_save", "nvs_set"];

#[test]
fn test_complete_first_match() {
    let mut completer = Completer::new();

    // First match in registration order
    let result = completer.complete("nvs", TEST_COMMANDS.iter().copied());
    assert_eq!(result, Some("nvs_dump"));
}

#[test]
fn test_complete_cycle() {
    let mut completer = Completer::new();

    // First tab: "nvs_s" -> "nvs_save"
    let r1 = completer.complete("nvs_s", TEST_COMMANDS.iter().copied());
    assert_eq!(r1, Some("nvs_save"));

    // Second tab: the line now holds the completion, prefix is kept
    let r2 = completer.complete("nvs_save", TEST_COMMANDS.iter().copied());
    assert_eq!(r2, Some("nvs_set"));

    // Third tab: wrap around
    let r3 = completer.complete("nvs_set", TEST_COMMANDS.iter().copied());
    assert_eq!(r3, Some("nvs_save"));
}

#[test]
fn test_complete_reset_starts_over() {
    let mut completer = Completer::new();

    completer.complete("nvs_s", TEST_COMMANDS.iter().copied());

    // Typing resets cycling, the new prefix applies
    completer.reset();
    let result = completer.complete("nvs_l", TEST_COMMANDS.iter().copied());
    assert_eq!(result, Some("nvs_load"));
}

#[test]
fn test_complete_no_match() {
    let mut completer = Completer::new();

    let result = completer.complete("xyz", TEST_COMMANDS.iter().copied());
    assert_eq!(result, None);
}

#[test]
fn test_complete_exact_match() {
    let mut completer = Completer::new();

    // Exact match still returns it
    let result = completer.complete("help", TEST_COMMANDS.iter().copied());
    assert_eq!(result, Some("help"));
}
