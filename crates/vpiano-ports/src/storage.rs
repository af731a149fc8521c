use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_sample_rate_hz() -> u32 {
    48_000
}

fn default_window_size() -> usize {
    1024
}

fn default_hop_size() -> usize {
    256
}

fn default_normalize_headroom_bits() -> u32 {
    12
}

fn default_mix_buffer_len() -> usize {
    160_000
}

fn default_write_lead_samples() -> usize {
    512
}

fn default_brightness_threshold() -> u32 {
    30
}

fn default_hysteresis_margin() -> u32 {
    10
}

fn default_luminance_threshold() -> f32 {
    0.79
}

fn default_frame_delay_ms() -> u64 {
    33
}

fn default_screen_width() -> usize {
    640
}

fn default_screen_height() -> usize {
    480
}

fn default_master_volume() -> Volume01 {
    Volume01::new(0.8)
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Pixel geometry of the projected keyboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyGeometry {
    pub white_key_width: i32,
    pub white_key_height: i32,
    pub black_key_width: i32,
    pub black_key_height: i32,
    /// Frame position of the keyboard's top-left corner.
    pub origin_x: i32,
    pub origin_y: i32,
    /// How far a black key starts left of the white-key boundary it straddles,
    /// indexed by pitch class (C = 0). Zero marks a white key.
    pub key_offsets: [i32; 12],
}

impl Default for KeyGeometry {
    fn default() -> Self {
        Self {
            white_key_width: 12,
            white_key_height: 80,
            black_key_width: 8,
            black_key_height: 50,
            origin_x: 8,
            origin_y: 300,
            key_offsets: [0, 6, 0, 3, 0, 0, 6, 0, 4, 0, 3, 0],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub key_layout: KeyLayout,
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    #[serde(default = "default_normalize_headroom_bits")]
    pub normalize_headroom_bits: u32,
    #[serde(default = "default_mix_buffer_len")]
    pub mix_buffer_len: usize,
    #[serde(default = "default_write_lead_samples")]
    pub write_lead_samples: usize,
    pub note_trigger: NoteTrigger,
    #[serde(default = "default_brightness_threshold")]
    pub brightness_threshold: u32,
    #[serde(default = "default_hysteresis_margin")]
    pub hysteresis_margin: u32,
    #[serde(default = "default_luminance_threshold")]
    pub luminance_threshold: f32,
    pub geometry: KeyGeometry,
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    #[serde(default = "default_master_volume")]
    pub master_volume: Volume01,
    #[serde(default = "default_screen_width")]
    pub screen_width: usize,
    #[serde(default = "default_screen_height")]
    pub screen_height: usize,
    pub samples_dir: Option<String>,
    pub audio_device: Option<DeviceId>,
    pub audio_buffer_size_frames: Option<u32>,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            key_layout: KeyLayout::Full88,
            sample_rate_hz: default_sample_rate_hz(),
            window_size: default_window_size(),
            hop_size: default_hop_size(),
            normalize_headroom_bits: default_normalize_headroom_bits(),
            mix_buffer_len: default_mix_buffer_len(),
            write_lead_samples: default_write_lead_samples(),
            note_trigger: NoteTrigger::RisingEdge,
            brightness_threshold: default_brightness_threshold(),
            hysteresis_margin: default_hysteresis_margin(),
            luminance_threshold: default_luminance_threshold(),
            geometry: KeyGeometry::default(),
            frame_delay_ms: default_frame_delay_ms(),
            master_volume: default_master_volume(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            samples_dir: None,
            audio_device: None,
            audio_buffer_size_frames: None,
        }
    }
}

impl SettingsDto {
    /// Samples the consumer drains during one producer frame.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate_hz as u64 * self.frame_delay_ms / 1000) as usize
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
