use pretty_assertions::assert_eq;
use std::path::PathBuf;
use vpiano_infra_storage_fs::FsStorage;
use vpiano_ports::storage::{SettingsDto, StorageError, StoragePort};
use vpiano_ports::types::{KeyLayout, NoteTrigger};

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("vpiano-storage-{}-{name}", std::process::id()))
}

#[test]
fn missing_file_gives_defaults() {
    let storage = FsStorage::new(scratch_dir("missing"));
    let settings = storage.load_settings().unwrap();
    assert_eq!(settings.window_size, 1024);
    assert_eq!(settings.hop_size, 256);
    assert_eq!(settings.mix_buffer_len, 160_000);
    assert_eq!(settings.key_layout, KeyLayout::Full88);
    assert_eq!(settings.note_trigger, NoteTrigger::RisingEdge);
}

#[test]
fn saved_settings_load_back() {
    let dir = scratch_dir("save");
    let storage = FsStorage::new(dir.clone());
    let settings = SettingsDto {
        key_layout: KeyLayout::Reduced61,
        brightness_threshold: 44,
        samples_dir: Some("/tmp/anchors".to_string()),
        ..SettingsDto::default()
    };
    storage.save_settings(&settings).unwrap();

    let loaded = storage.load_settings().unwrap();
    assert_eq!(loaded.key_layout, KeyLayout::Reduced61);
    assert_eq!(loaded.brightness_threshold, 44);
    assert_eq!(loaded.samples_dir.as_deref(), Some("/tmp/anchors"));
    assert_eq!(loaded.geometry, settings.geometry);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = scratch_dir("partial");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("settings.json"),
        br#"{ "hop_size": 128, "geometry": { "white_key_width": 20 } }"#,
    )
    .unwrap();

    let loaded = FsStorage::new(dir.clone()).load_settings().unwrap();
    assert_eq!(loaded.hop_size, 128);
    assert_eq!(loaded.window_size, 1024);
    assert_eq!(loaded.geometry.white_key_width, 20);
    assert_eq!(loaded.geometry.black_key_width, 8);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = scratch_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("settings.json"), b"not json").unwrap();

    let err = FsStorage::new(dir.clone()).load_settings().unwrap_err();
    assert!(matches!(err, StorageError::Serde(_)));
    let _ = std::fs::remove_dir_all(&dir);
}
