use crate::mix_buffer::MixCursors;
use serde::Serialize;
use std::fs;
use std::path::Path;
use vpiano_ports::storage::{SettingsDto, StorageError};
use vpiano_ports::types::{AudioOutputDevice, KeyState, SampleTime};

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct KeySnapshot<'a> {
    frame: u64,
    states: &'a [KeyState],
    bright_counts: &'a [u32],
}

#[derive(Serialize)]
struct MixTimeline {
    #[serde(flatten)]
    cursors: MixCursors,
    stream_sample_time: Option<SampleTime>,
}

pub struct DiagnosticsSnapshot<'a> {
    pub settings: &'a SettingsDto,
    pub audio_outputs: Vec<AudioOutputDevice>,
    pub frame: u64,
    pub key_states: &'a [KeyState],
    pub bright_counts: &'a [u32],
    pub cursors: MixCursors,
    pub stream_sample_time: Option<SampleTime>,
}

pub fn export_diagnostics(dir: &Path, snapshot: &DiagnosticsSnapshot<'_>) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "VirtualPiano".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), snapshot.settings)?;
    write_json(&dir.join("audio_outputs.json"), &snapshot.audio_outputs)?;
    write_json(
        &dir.join("key_states.json"),
        &KeySnapshot {
            frame: snapshot.frame,
            states: snapshot.key_states,
            bright_counts: snapshot.bright_counts,
        },
    )?;
    write_json(
        &dir.join("mix_cursors.json"),
        &MixTimeline {
            cursors: snapshot.cursors,
            stream_sample_time: snapshot.stream_sample_time,
        },
    )?;

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
