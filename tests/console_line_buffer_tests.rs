//! Line buffer tests

use eeprom_console::console::line_buffer::{LineBuffer, LINE_CAPACITY};

fn filled(text: &str) -> LineBuffer {
    let mut buf = LineBuffer::new();
    for b in text.bytes() {
        buf.insert(b).unwrap();
    }
    buf
}

#[test]
fn test_line_buffer_insert() {
    let buf = filled("help");

    assert_eq!(buf.as_str(), "help");
    assert_eq!(buf.cursor(), 4);
}

#[test]
fn test_line_buffer_backspace() {
    let mut buf = filled("help");
    assert!(buf.delete_before_cursor());
    assert!(buf.delete_before_cursor());

    assert_eq!(buf.as_str(), "he");
}

#[test]
fn test_line_buffer_backspace_empty() {
    let mut buf = LineBuffer::new();

    assert!(!buf.delete_before_cursor()); // should not panic
    assert_eq!(buf.as_str(), "");
}

#[test]
fn test_line_buffer_delete_at_end_is_noop() {
    let mut buf = filled("nvs");

    assert!(!buf.delete_at_cursor());
    assert_eq!(buf.as_str(), "nvs");
}

#[test]
fn test_line_buffer_clear() {
    let mut buf = filled("help");
    buf.clear();

    assert_eq!(buf.as_str(), "");
    assert!(buf.is_empty());
    assert_eq!(buf.cursor(), 0);
}

#[test]
fn test_line_buffer_set_from_str() {
    let mut buf = filled("x");

    buf.set("nvs_get kp_0").unwrap();
    assert_eq!(buf.as_str(), "nvs_get kp_0");
    assert_eq!(buf.cursor(), 12);
}

#[test]
fn test_line_buffer_capacity() {
    let mut buf = LineBuffer::new();

    for i in 0..LINE_CAPACITY {
        buf.insert(b'a' + (i % 26) as u8).unwrap();
    }
    assert!(buf.is_full());
    assert!(buf.insert(b'z').is_err());
    assert_eq!(buf.len(), LINE_CAPACITY);
}
