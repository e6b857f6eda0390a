//! Configuration store tests: persistence, CRC and version gating

use eeprom_console::config::{find_param, ConfigRecord, ConfigStore, ParamValue, StoreError, StoreLayout, RECORD_SIZE, STORAGE_VERSION};
use eeprom_console::crc::crc;
use eeprom_console::medium::{Medium, MemoryMedium, OP_TIMEOUT_TICKS};

fn param(name: &str) -> usize {
    find_param(name).expect("parameter exists").0
}

#[test]
fn test_crc_check_value() {
    assert_eq!(crc(b"123456789"), 0xFC89_1918);
}

#[test]
fn test_save_then_load_round_trip() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();

    store.record_mut().set(param("motion_timeout"), ParamValue::U32(45_000_000));
    store.record_mut().set(param("kp_1"), ParamValue::F32(7.5));
    store.record_mut().set(param("seal_enabled"), ParamValue::Bool(true));
    store.save(&mut medium).unwrap();
    let saved = *store.record().as_bytes();

    let mut fresh = ConfigStore::default();
    fresh.load(&mut medium).unwrap();

    assert_eq!(fresh.record().as_bytes(), &saved);
    assert_eq!(fresh.stored_version(), Some(STORAGE_VERSION));
    assert_eq!(fresh.record().get(param("kp_1")), ParamValue::F32(7.5));
    assert!(fresh.record().is_sealed());
}

#[test]
fn test_bit_flip_is_crc_mismatch_and_keeps_record() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();
    store.save(&mut medium).unwrap();

    let layout = StoreLayout::DEFAULT;
    medium.flip_bit(layout.data_start + 1, 17, 3);

    let mut other = ConfigStore::default();
    other.record_mut().set(param("homing_timeout"), ParamValue::U32(5_000_000));
    let before = *other.record().as_bytes();

    match other.load(&mut medium) {
        Err(StoreError::CrcMismatch { stored, computed }) => assert_ne!(stored, computed),
        other => panic!("expected CRC mismatch, got {:?}", other),
    }
    assert_eq!(other.record().as_bytes(), &before);
}

#[test]
fn test_version_gating() {
    let layout = StoreLayout::DEFAULT;
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();
    store.save(&mut medium).unwrap();

    for wrong in [0u32, STORAGE_VERSION - 1, STORAGE_VERSION + 1] {
        medium.erase_page(layout.version_page, OP_TIMEOUT_TICKS).unwrap();
        medium.poke_word(layout.version_page, 0, wrong);

        let mut other = ConfigStore::default();
        assert_eq!(other.load(&mut medium), Err(StoreError::VersionMismatch { found: wrong }));
        assert_eq!(other.record().as_bytes(), ConfigRecord::defaults().as_bytes());
    }

    medium.erase_page(layout.version_page, OP_TIMEOUT_TICKS).unwrap();
    medium.poke_word(layout.version_page, 0, STORAGE_VERSION);
    assert!(ConfigStore::default().load(&mut medium).is_ok());
}

#[test]
fn test_reset_is_idempotent() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();
    store.save(&mut medium).unwrap();

    let layout = StoreLayout::DEFAULT;
    let data = layout.data_start..layout.data_end();
    let pages_before: Vec<_> = data.clone().map(|p| *medium.page(p)).collect();
    let erases_before: Vec<_> = data.clone().map(|p| medium.erase_count(p)).collect();

    store.reset(&mut medium).unwrap();
    let after_one = *medium.page(layout.version_page);
    store.reset(&mut medium).unwrap();

    assert_eq!(medium.page(layout.version_page), &after_one);
    // Record pages are left alone
    let pages_after: Vec<_> = data.clone().map(|p| *medium.page(p)).collect();
    let erases_after: Vec<_> = data.map(|p| medium.erase_count(p)).collect();
    assert_eq!(pages_after, pages_before);
    assert_eq!(erases_after, erases_before);
    assert_eq!(
        store.load(&mut medium),
        Err(StoreError::VersionMismatch { found: 0xFFFF_FFFF })
    );
}

#[test]
fn test_save_reload_scenario() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();

    // First boot: blank medium, defaults stay live
    assert_eq!(
        store.initialize(&mut medium),
        Ok(Some(StoreError::VersionMismatch { found: 0xFFFF_FFFF }))
    );
    assert_eq!(store.record().as_bytes(), ConfigRecord::defaults().as_bytes());

    store.record_mut().set(param("jog_speed_0"), ParamValue::F32(0.35));
    store.save(&mut medium).unwrap();

    // Second boot
    let mut rebooted = ConfigStore::default();
    assert_eq!(rebooted.initialize(&mut medium), Ok(None));
    assert_eq!(rebooted.record().get(param("jog_speed_0")), ParamValue::F32(0.35));
}

#[test]
fn test_torn_save_never_loads() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();
    store.save(&mut medium).unwrap();

    // Cut power after the marker and the first data page
    store.record_mut().set(param("accel_1"), ParamValue::F32(1.25));
    medium.tear_after_writes(2);
    store.save(&mut medium).unwrap();
    medium.heal();

    let mut rebooted = ConfigStore::default();
    assert!(matches!(
        rebooted.load(&mut medium),
        Err(StoreError::CrcMismatch { .. })
    ));
}

#[test]
fn test_timeout_is_reported() {
    let mut medium = MemoryMedium::<64>::new();
    medium.fail_after(0);

    let mut store = ConfigStore::default();
    assert_eq!(store.save(&mut medium), Err(StoreError::Timeout));
    assert_eq!(store.initialize(&mut medium), Err(StoreError::Timeout));
    assert_eq!(StoreError::Timeout.status(), 3);
}

#[test]
fn test_self_test_passes_and_resets() {
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();
    store.save(&mut medium).unwrap();

    let mut diffs = 0;
    assert_eq!(store.self_test(&mut medium, |_, _, _| diffs += 1), Ok(()));
    assert_eq!(diffs, 0);
    assert!(matches!(
        ConfigStore::default().load(&mut medium),
        Err(StoreError::VersionMismatch { .. })
    ));
}

#[test]
fn test_self_test_reports_stuck_bits() {
    let layout = StoreLayout::DEFAULT;
    let mut medium = MemoryMedium::<64>::new();
    let mut store = ConfigStore::default();

    // Writes are dropped: every programmed byte reads back erased
    medium.tear_after_writes(0);
    let mut diffs = Vec::new();
    let result = store.self_test(&mut medium, |offset, w, r| diffs.push((offset, w, r)));

    assert!(matches!(result, Err(StoreError::CrcMismatch { .. })));
    assert!(!diffs.is_empty());
    assert!(diffs.iter().all(|&(offset, w, r)| offset < RECORD_SIZE && r == 0xFF && w != r));
    assert!(medium.page(layout.data_start).iter().all(|&b| b == 0xFF));
}

#[test]
fn test_audit_changes_with_contents() {
    let mut medium = MemoryMedium::<64>::new();
    let store = ConfigStore::default();
    let blank = store.medium_audit(&mut medium).unwrap();

    medium.flip_bit(0, 0, 0);
    assert_ne!(store.medium_audit(&mut medium).unwrap(), blank);
}
