use serde::{Deserialize, Serialize};
use vpiano_ports::storage::SettingsDto;
use vpiano_ports::types::{
    AudioConfig, AudioOutputDevice, DeviceId, KeyIndex, KeyLayout, KeyState, NoteTrigger,
    SampleTime, Volume01,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    ListAudioOutputs,
    SelectAudioOutput {
        device_id: Option<DeviceId>,
        config: Option<AudioConfig>,
    },
    SetMasterVolume { volume: Volume01 },
    SetMuted { muted: bool },
    SetDetection {
        brightness_threshold: u32,
        hysteresis_margin: u32,
        luminance_threshold: f32,
    },
    SetNoteTrigger { trigger: NoteTrigger },
    ResetKeys,
    ExportDiagnostics { path: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    AudioOutputsUpdated { devices: Vec<AudioOutputDevice> },
    SettingsUpdated { settings: SettingsDto },
    BankReady { layout: KeyLayout, keys: usize },
    NoteTriggered { key: KeyIndex, sample_time: SampleTime },
    KeyStatesUpdated { frame: u64, states: Vec<KeyState> },
}
