//! Tests for the SettingsFile backend
//!
//! These tests verify:
//! - Get in its existence / length / read modes
//! - Set replace semantics
//! - Add for multi-valued keys
//! - Delete by index and delete-all
//! - Wipe
//! - Lifecycle (load/close/reopen)

use std::fs;

use tinysettings::log::Record;
use tinysettings::{Config, SettingsBackend, SettingsError, SettingsFile, Target};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Config, SettingsFile) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .settings_dir(temp_dir.path())
        .base_name("test")
        .build();
    let store = SettingsFile::open(&config).unwrap();
    (temp_dir, config, store)
}

/// 0, 1, 2, ... 59
fn sample_data() -> Vec<u8> {
    (0..60u8).collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_data_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("settings");
    let config = Config::builder().settings_dir(&dir).base_name("node").build();

    let store = SettingsFile::open(&config).unwrap();

    assert!(dir.join("node.data").exists());
    assert!(!dir.join("node.Swap").exists());
    assert_eq!(store.size().unwrap(), 0);
}

#[test]
fn test_empty_store_misses() {
    let (_temp, _config, mut store) = setup_temp_store();
    let mut buf = [0u8; 60];

    assert!(matches!(store.get(0, 0, Some(&mut buf[..])), Err(SettingsError::NotFound)));
    assert!(matches!(store.delete(0, Target::Index(0)), Err(SettingsError::NotFound)));
    assert!(matches!(store.delete(0, Target::All), Err(SettingsError::NotFound)));
}

#[test]
fn test_set_get_round_trip() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.set(0, &data).unwrap();

    let mut buf = [0u8; 60];
    assert_eq!(store.get(0, 0, Some(&mut buf[..])).unwrap(), 60);
    assert_eq!(&buf[..], &data[..]);
}

#[test]
fn test_get_existence_and_length_modes() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.set(0, &data[..30]).unwrap();

    // Existence / length probe
    assert_eq!(store.get(0, 0, None).unwrap(), 30);
    assert!(store.contains(0, 0).unwrap());

    // Wrong index, wrong key
    assert!(matches!(store.get(0, 1, None), Err(SettingsError::NotFound)));
    assert!(matches!(store.get(1, 0, None), Err(SettingsError::NotFound)));
    assert!(!store.contains(1, 0).unwrap());
}

#[test]
fn test_get_into_short_buffer() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();
    store.set(0, &data[..30]).unwrap();

    let mut buf = [0u8; 30];
    let length = store.get(0, 0, Some(&mut buf[..29])).unwrap();

    // True length reported, only 29 bytes copied, last byte untouched
    assert_eq!(length, 30);
    assert_eq!(&buf[..29], &data[..29]);
    assert_eq!(buf[29], 0);
}

#[test]
fn test_get_into_zero_capacity_buffer() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.set(4, b"value").unwrap();

    let mut buf: [u8; 0] = [];
    assert_eq!(store.get(4, 0, Some(&mut buf[..])).unwrap(), 5);
}

#[test]
fn test_empty_value() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.set(2, b"").unwrap();

    assert_eq!(store.get(2, 0, None).unwrap(), 0);
    assert_eq!(store.get_value(2, 0).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_oversized_value_rejected() {
    let (_temp, _config, mut store) = setup_temp_store();
    let value = vec![0u8; 70_000];

    assert!(matches!(store.set(1, &value), Err(SettingsError::NoBufs(_))));
    assert!(matches!(store.add(1, &value), Err(SettingsError::NoBufs(_))));
    assert!(!store.swap_path().exists());
    assert_eq!(store.size().unwrap(), 0);
}

// =============================================================================
// Multi-Value Tests
// =============================================================================

#[test]
fn test_set_then_add_two_records() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.set(0, &data).unwrap();
    store.add(0, &data[..30]).unwrap();

    assert_eq!(store.get_value(0, 1).unwrap(), &data[..30]);
    assert_eq!(store.get_value(0, 0).unwrap(), data);
    assert!(matches!(store.get(0, 2, None), Err(SettingsError::NotFound)));
}

#[test]
fn test_add_values_of_different_keys() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.set(0, &data).unwrap();
    store.add(1, &data[..30]).unwrap();

    assert_eq!(store.get_value(1, 0).unwrap(), &data[..30]);
    assert_eq!(store.get_value(0, 0).unwrap(), data);
}

#[test]
fn test_add_to_empty_store() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.add(0x8001, b"first").unwrap();

    assert_eq!(store.get_all(0x8001).unwrap(), vec![b"first".to_vec()]);
}

#[test]
fn test_set_replaces_every_value() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.add(7, b"v1").unwrap();
    store.add(7, b"v2").unwrap();
    store.add(8, b"other").unwrap();
    store.set(7, b"v3").unwrap();

    assert_eq!(store.get_all(7).unwrap(), vec![b"v3".to_vec()]);
    assert!(matches!(store.get(7, 1, None), Err(SettingsError::NotFound)));
    assert_eq!(store.get_value(8, 0).unwrap(), b"other");
}

#[test]
fn test_records_keep_file_order() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.add(1, b"a").unwrap();
    store.add(2, b"b").unwrap();
    store.add(1, b"c").unwrap();
    store.set(2, b"d").unwrap();

    assert_eq!(
        store.records().unwrap(),
        vec![
            Record::new(1, b"a".to_vec()),
            Record::new(1, b"c".to_vec()),
            Record::new(2, b"d".to_vec()),
        ]
    );
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_by_index() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.add(0, &data).unwrap();
    store.add(0, &data[..30]).unwrap();
    store.add(0, &data[..20]).unwrap();

    // Wrong key, wrong index
    assert!(matches!(store.delete(1, Target::Index(0)), Err(SettingsError::NotFound)));
    assert!(matches!(store.delete(1, Target::All), Err(SettingsError::NotFound)));
    assert!(matches!(store.delete(0, Target::Index(3)), Err(SettingsError::NotFound)));

    store.delete(0, Target::Index(1)).unwrap();

    let values = store.get_all(0).unwrap();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&data));
    assert!(values.contains(&data[..20].to_vec()));
    assert_eq!(store.get(0, 1, None).unwrap(), 20);
}

#[test]
fn test_delete_all_of_key() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.add(0, &data).unwrap();
    store.add(0, &data[..30]).unwrap();
    store.add(0, &data[..20]).unwrap();

    store.delete(0, Target::All).unwrap();

    assert!(matches!(store.get(0, 0, None), Err(SettingsError::NotFound)));
    assert_eq!(store.size().unwrap(), 0);
}

#[test]
fn test_delete_all_leaves_other_keys_byte_identical() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.add(0, &data).unwrap();
    store.add(1, &data[..30]).unwrap();
    store.add(0, &data[..20]).unwrap();
    store.add(2, b"tail").unwrap();

    let expected: Vec<u8> = [
        Record::new(1, data[..30].to_vec()).encode().unwrap(),
        Record::new(2, b"tail".to_vec()).encode().unwrap(),
    ]
    .concat();

    store.delete(0, Target::All).unwrap();

    assert_eq!(fs::read(store.data_path()).unwrap(), expected);
    assert_eq!(store.get_value(1, 0).unwrap(), &data[..30]);
    assert!(matches!(store.delete(0, Target::Index(0)), Err(SettingsError::NotFound)));
}

#[test]
fn test_failed_delete_leaves_no_swap_file() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.add(1, b"a").unwrap();

    assert!(store.delete(2, Target::All).is_err());

    assert!(!store.swap_path().exists());
    assert_eq!(store.get_value(1, 0).unwrap(), b"a");
}

#[test]
fn test_end_to_end_reindexing() {
    let (_temp, _config, mut store) = setup_temp_store();
    let data = sample_data();

    store.set(0, &data).unwrap();
    assert_eq!(store.get(0, 0, None).unwrap(), 60);

    store.add(0, &data[..30]).unwrap();
    assert_eq!(store.get_value(0, 1).unwrap(), &data[..30]);
    assert_eq!(store.get_value(0, 0).unwrap(), data);

    store.delete(0, Target::Index(0)).unwrap();
    assert_eq!(store.get_value(0, 0).unwrap(), &data[..30]);
    assert!(matches!(store.get(0, 1, None), Err(SettingsError::NotFound)));
}

// =============================================================================
// Wipe Tests
// =============================================================================

#[test]
fn test_wipe_clears_everything() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.add(1, b"a").unwrap();
    store.add(2, b"b").unwrap();
    store.wipe().unwrap();

    assert!(matches!(store.get(1, 0, None), Err(SettingsError::NotFound)));
    assert!(matches!(store.get(2, 0, None), Err(SettingsError::NotFound)));
    assert_eq!(store.size().unwrap(), 0);
}

#[test]
fn test_wipe_twice() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.add(1, b"a").unwrap();
    store.wipe().unwrap();
    store.wipe().unwrap();

    assert!(store.records().unwrap().is_empty());

    // Still usable afterwards
    store.set(1, b"b").unwrap();
    assert_eq!(store.get_value(1, 0).unwrap(), b"b");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_values_survive_reopen() {
    let (_temp, config, mut store) = setup_temp_store();

    store.set(1, b"persisted").unwrap();
    store.add(2, b"x").unwrap();
    store.add(2, b"y").unwrap();
    store.close();

    let mut reopened = SettingsFile::open(&config).unwrap();
    assert_eq!(reopened.get_value(1, 0).unwrap(), b"persisted");
    assert_eq!(reopened.get_all(2).unwrap(), vec![b"x".to_vec(), b"y".to_vec()]);
}

#[test]
fn test_operations_after_close_fail() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.close();

    assert!(!store.is_open());
    assert!(matches!(store.get(1, 0, None), Err(SettingsError::NotInitialized)));
    assert!(matches!(store.set(1, b"a"), Err(SettingsError::NotInitialized)));
    assert!(matches!(store.wipe(), Err(SettingsError::NotInitialized)));
}

#[test]
fn test_trait_init_and_deinit() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .settings_dir(temp_dir.path())
        .base_name("trait")
        .build();
    let mut store = SettingsFile::new(&config).unwrap();
    assert!(!store.is_open());

    SettingsBackend::init(&mut store, &[]).unwrap();
    SettingsBackend::set(&mut store, 1, b"a").unwrap();
    SettingsBackend::deinit(&mut store).unwrap();
    assert!(!store.is_open());

    // Init is repeatable
    SettingsBackend::init(&mut store, &[]).unwrap();
    SettingsBackend::init(&mut store, &[]).unwrap();
    assert_eq!(store.get_value(1, 0).unwrap(), b"a");
}

#[test]
fn test_invalid_base_name_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .settings_dir(temp_dir.path())
        .base_name("../escape")
        .build();

    assert!(matches!(SettingsFile::new(&config), Err(SettingsError::Config(_))));
}
