//! Command registry and dispatcher tests

use core::fmt::Write;

use eeprom_console::console::builtins::register_builtins;
use eeprom_console::console::registry::{Call, CommandRegistry, DispatchOutcome};
use eeprom_console::console::{ConsoleError, EXIT_FAILURE, EXIT_SUCCESS};

#[derive(Default)]
struct Recorder {
    argc: usize,
    args: Vec<String>,
    calls: u32,
}

fn foo(ctx: &mut Recorder, call: &Call<'_, Recorder>, _out: &mut dyn Write) -> u8 {
    ctx.calls += 1;
    ctx.argc = call.argc();
    ctx.args = call.args().iter().map(|s| s.to_string()).collect();
    EXIT_SUCCESS
}

fn fails(_ctx: &mut Recorder, _call: &Call<'_, Recorder>, out: &mut dyn Write) -> u8 {
    let _ = out.write_str("nope");
    7
}

fn registry() -> CommandRegistry<Recorder> {
    let mut registry = CommandRegistry::new();
    registry.register("foo", "records its arguments", Some(foo)).unwrap();
    registry.register("fails", "returns 7", Some(fails)).unwrap();
    registry.register("stub", "no handler yet", None).unwrap();
    registry
}

#[test]
fn test_dispatch_passes_argv() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    let outcome = registry.dispatch("foo a b c", &mut ctx, &mut out);

    assert_eq!(outcome, DispatchOutcome::Completed { status: 0 });
    assert_eq!(ctx.argc, 4);
    assert_eq!(ctx.args, ["a", "b", "c"]);
    assert!(out.contains("\x1b[32m(foo returned 0)"));
}

#[test]
fn test_dispatch_unknown() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    let outcome = registry.dispatch("bar", &mut ctx, &mut out);

    assert_eq!(outcome, DispatchOutcome::Unknown);
    assert_eq!(outcome.error(), Some(ConsoleError::UnknownCommand));
    assert!(out.contains("command \"bar\" unknown, try: help"));
    assert_eq!(ctx.calls, 0);
}

#[test]
fn test_dispatch_is_case_sensitive() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    assert_eq!(registry.dispatch("FOO", &mut ctx, &mut out), DispatchOutcome::Unknown);
}

#[test]
fn test_dispatch_missing_handler() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    assert_eq!(registry.dispatch("stub x", &mut ctx, &mut out), DispatchOutcome::HandlerMissing);
    assert!(out.contains("command \"stub\" exists but no function is associated to it"));
}

#[test]
fn test_failure_status_printed_red() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    assert_eq!(registry.dispatch("fails", &mut ctx, &mut out), DispatchOutcome::Completed { status: 7 });
    assert!(out.contains("\x1b[31m(fails returned 7)"));
}

#[test]
fn test_blank_line() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    assert_eq!(registry.dispatch(" \t ", &mut ctx, &mut out), DispatchOutcome::Empty);
    assert!(out.as_str().is_empty());
}

#[test]
fn test_extra_tokens_dropped() {
    let registry = registry();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    registry.dispatch("foo 1 2 3 4 5 6 7 8 9", &mut ctx, &mut out);

    assert!(out.contains("maximum number of arguments is 7, ignoring the rest"));
    assert_eq!(ctx.argc, 8);
    assert_eq!(ctx.args.last().map(String::as_str), Some("7"));
}

#[test]
fn test_full_table_rejected() {
    let mut registry = CommandRegistry::<Recorder, 2>::new();
    registry.register("a", "", Some(foo)).unwrap();
    registry.register("b", "", Some(foo)).unwrap();

    assert_eq!(registry.register("c", "", Some(foo)), Err(ConsoleError::CommandTableFull));
    assert_eq!(registry.len(), 2);
    assert!(registry.find("c").is_none());
}

#[test]
fn test_first_match_wins() {
    let mut registry = CommandRegistry::<Recorder, 4>::new();
    registry.register("dup", "first", Some(foo)).unwrap();
    registry.register("dup", "second", Some(fails)).unwrap();
    let mut ctx = Recorder::default();

    let outcome = registry.dispatch("dup", &mut ctx, &mut TestOutput::new());
    assert_eq!(outcome, DispatchOutcome::Completed { status: 0 });
    assert_eq!(ctx.calls, 1);
}

#[test]
fn test_help_lists_everything() {
    let mut registry = registry();
    register_builtins(&mut registry).unwrap();
    let mut ctx = Recorder::default();
    let mut out = TestOutput::new();

    registry.dispatch("help", &mut ctx, &mut out);

    for name in ["foo", "fails", "stub", "help", "cls", "log"] {
        assert!(out.contains(&format!("[{}]\r\n", name)), "missing {}", name);
    }
    assert!(out.contains("records its arguments"));
}

#[test]
fn test_help_single_and_errors() {
    let mut registry = registry();
    register_builtins(&mut registry).unwrap();
    let mut ctx = Recorder::default();

    let mut out = TestOutput::new();
    assert_eq!(
        registry.dispatch("help foo", &mut ctx, &mut out),
        DispatchOutcome::Completed { status: EXIT_SUCCESS }
    );
    assert!(out.contains("[foo]\r\nrecords its arguments"));
    assert!(!out.contains("[fails]"));

    let mut out = TestOutput::new();
    assert_eq!(
        registry.dispatch("help nothing", &mut ctx, &mut out),
        DispatchOutcome::Completed { status: EXIT_FAILURE }
    );
    assert!(out.contains("No help found for command nothing."));

    let mut out = TestOutput::new();
    assert_eq!(
        registry.dispatch("help a b", &mut ctx, &mut out),
        DispatchOutcome::Completed { status: EXIT_FAILURE }
    );
    assert!(out.contains("takes at most 1 argument"));
}

#[test]
fn test_cls() {
    let mut registry = CommandRegistry::<Recorder, 4>::new();
    register_builtins(&mut registry).unwrap();
    let mut ctx = Recorder::default();

    let mut out = TestOutput::new();
    registry.dispatch("cls", &mut ctx, &mut out);
    assert!(out.contains("\x1b[2J\x1b[H"));

    let mut out = TestOutput::new();
    assert_eq!(
        registry.dispatch("cls now", &mut ctx, &mut out),
        DispatchOutcome::Completed { status: EXIT_FAILURE }
    );
    assert!(out.contains("does not take any argument"));
}

// Test output buffer
struct TestOutput {
    buf: String,
}

impl TestOutput {
    fn new() -> Self {
        Self { buf: String::new() }
    }

    fn contains(&self, s: &str) -> bool {
        self.buf.contains(s)
    }

    fn as_str(&self) -> &str {
        &self.buf
    }
}

impl core::fmt::Write for TestOutput {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}
