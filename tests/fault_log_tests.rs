//! Fault log tests: ring wraparound, persistence and corruption recovery

use eeprom_console::fault::{FaultCode, FaultEntry, FaultLog, FAULT_LOG_CAPACITY};
use eeprom_console::medium::{MediumError, MemoryMedium};

const PAGE: u16 = 48;

/// Log past its blank-medium bootstrap entry.
fn fresh_log(medium: &mut MemoryMedium<64>) -> FaultLog {
    let mut log = FaultLog::new(PAGE);
    log.init(medium);
    log
}

#[test]
fn test_wraparound_keeps_newest_in_order() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = fresh_log(&mut medium);
    let bootstrap = log.count();

    // Total appends k + 16 with k = 9
    let total = FAULT_LOG_CAPACITY as u32 + 9;
    for i in 0..total - bootstrap {
        log.append(0x100 + i as u16, i as u16, &mut medium).unwrap();
    }
    assert_eq!(log.count(), total);
    assert_eq!(log.len(), FAULT_LOG_CAPACITY);

    let seqs: Vec<u32> = log.iter().map(|(seq, _)| seq).collect();
    let expected: Vec<u32> = (total - FAULT_LOG_CAPACITY as u32 + 1..=total).collect();
    assert_eq!(seqs, expected);

    let (_, newest) = log.iter().last().unwrap();
    assert_eq!(newest.arg as u32, total - bootstrap - 1);
}

#[test]
fn test_twenty_entries_scenario() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = FaultLog::new(PAGE);
    log.init(&mut medium);
    // 1 bootstrap entry + 19 appends
    for i in 1..20u16 {
        log.append(i, 0xA000 | i, &mut medium).unwrap();
    }
    assert_eq!(log.count(), 20);

    let entries: Vec<(u32, FaultEntry)> = log.iter().collect();
    assert_eq!(entries.len(), 16);
    assert_eq!(entries[0].0, 5);
    assert_eq!(entries[15].0, 20);
    assert_eq!(entries[0].1, FaultEntry { code: 4, arg: 0xA004 });
    assert_eq!(entries[15].1, FaultEntry { code: 19, arg: 0xA013 });
}

#[test]
fn test_twenty_appends_to_empty_log() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = FaultLog::new(PAGE);
    for code in 1..=20u16 {
        log.append(code, 0, &mut medium).unwrap();
    }

    let codes: Vec<u16> = log.iter().map(|(_, e)| e.code).collect();
    let seqs: Vec<u32> = log.iter().map(|(seq, _)| seq).collect();
    assert_eq!(codes, (5..=20).collect::<Vec<u16>>());
    assert_eq!(seqs, (5..=20).collect::<Vec<u32>>());
}

#[test]
fn test_survives_reboot() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = fresh_log(&mut medium);
    log.record(FaultCode::ConfigCrc, 0x1234, &mut medium).unwrap();
    let before: Vec<_> = log.iter().collect();

    let mut rebooted = FaultLog::new(PAGE);
    rebooted.init(&mut medium);
    let after: Vec<_> = rebooted.iter().collect();

    assert_eq!(before, after);
    assert_eq!(after.last().unwrap().1.fault_code(), Some(FaultCode::ConfigCrc));
}

#[test]
fn test_corrupt_block_is_reset() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = fresh_log(&mut medium);
    for _ in 0..5 {
        log.record(FaultCode::QueueOverflow, 1, &mut medium).unwrap();
    }

    medium.flip_bit(PAGE, 10, 1);

    let mut rebooted = FaultLog::new(PAGE);
    rebooted.init(&mut medium);
    let entries: Vec<_> = rebooted.iter().collect();
    assert_eq!(entries, [(1, FaultEntry::new(FaultCode::LogCorrupt, 0))]);
}

#[test]
fn test_write_failure_keeps_entry_in_memory() {
    let mut medium = MemoryMedium::<64>::new();
    let mut log = fresh_log(&mut medium);
    medium.fail_after(0);

    assert_eq!(
        log.record(FaultCode::MediumTimeout, 0, &mut medium),
        Err(MediumError::Timeout)
    );
    assert_eq!(log.iter().last().unwrap().1.fault_code(), Some(FaultCode::MediumTimeout));
}

#[test]
fn test_entry_display() {
    let entry = FaultEntry { code: 0x00FF, arg: 0x0010 };
    assert_eq!(entry.to_string(), "0x00FF (0x0010)");
    let known = FaultEntry::new(FaultCode::QueueOverflow, 3);
    assert!(known.to_string().starts_with("0x0006 (0x0003)"));
}
