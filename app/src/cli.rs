//! Command-line argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vpiano_ports::storage::SettingsDto;
use vpiano_ports::types::{KeyLayout, NoteTrigger, Volume01};

#[derive(Parser, Debug)]
#[command(name = "vpiano")]
#[command(about = "Camera-triggered sample piano", long_about = None)]
pub struct Args {
    /// Log verbosity: error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory holding C1.wav .. C8.wav
    #[arg(long, value_name = "DIR")]
    pub samples: Option<PathBuf>,

    /// Keyboard layout
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// When a lit key writes its note
    #[arg(long, value_enum)]
    pub trigger: Option<TriggerArg>,

    /// Output sample rate in Hz
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Lit-pixel count around which a key switches
    #[arg(long, value_name = "PIXELS")]
    pub threshold: Option<u32>,

    /// Hysteresis guard band on each side of the threshold
    #[arg(long, value_name = "PIXELS")]
    pub margin: Option<u32>,

    /// Delay between camera frames
    #[arg(long, value_name = "MS")]
    pub frame_delay_ms: Option<u64>,

    /// Master volume, 0.0 to 1.0
    #[arg(long, value_name = "VOLUME")]
    pub volume: Option<f32>,

    /// Settings directory (defaults to the platform config dir)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Persist the effective settings after applying overrides
    #[arg(long)]
    pub save_settings: bool,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Play a frame sequence live through the audio device
    Play {
        /// Directory of camera frames, played in name order
        frames: PathBuf,

        /// Output device id as listed by --list-devices
        #[arg(long)]
        device: Option<String>,

        /// Print the available output devices and exit
        #[arg(long)]
        list_devices: bool,

        #[command(flatten)]
        screen: ScreenArgs,

        /// Write diagnostics here when playback ends
        #[arg(long, value_name = "DIR")]
        diagnostics: Option<PathBuf>,
    },
    /// Render a frame sequence to a WAV file
    Render {
        /// Directory of camera frames, played in name order
        frames: PathBuf,

        /// Output WAV file
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        screen: ScreenArgs,
    },
    /// Synthesize every key and write one WAV file per key
    Bank {
        /// Output directory
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct ScreenArgs {
    /// Save the display buffer as PNG snapshots into this directory
    #[arg(long, value_name = "DIR")]
    pub screen_dir: Option<PathBuf>,

    /// Frames between snapshots
    #[arg(long, value_name = "FRAMES", default_value = "30")]
    pub screen_every: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LayoutArg {
    Full88,
    Reduced61,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TriggerArg {
    RisingEdge,
    WhileActive,
}

impl Args {
    /// Overrides the persisted settings with whatever was given on the
    /// command line.
    pub fn apply(&self, settings: &mut SettingsDto) {
        if let Some(dir) = &self.samples {
            settings.samples_dir = Some(dir.to_string_lossy().into_owned());
        }
        if let Some(layout) = self.layout {
            settings.key_layout = match layout {
                LayoutArg::Full88 => KeyLayout::Full88,
                LayoutArg::Reduced61 => KeyLayout::Reduced61,
            };
        }
        if let Some(trigger) = self.trigger {
            settings.note_trigger = match trigger {
                TriggerArg::RisingEdge => NoteTrigger::RisingEdge,
                TriggerArg::WhileActive => NoteTrigger::WhileActive,
            };
        }
        if let Some(rate) = self.sample_rate {
            settings.sample_rate_hz = rate;
        }
        if let Some(threshold) = self.threshold {
            settings.brightness_threshold = threshold;
        }
        if let Some(margin) = self.margin {
            settings.hysteresis_margin = margin;
        }
        if let Some(delay) = self.frame_delay_ms {
            settings.frame_delay_ms = delay;
        }
        if let Some(volume) = self.volume {
            settings.master_volume = Volume01::new(volume);
        }
    }
}
