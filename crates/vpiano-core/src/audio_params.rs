use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use vpiano_ports::storage::SettingsDto;
use vpiano_ports::types::Volume01;

/// Output controls shared with the audio thread.
#[derive(Debug)]
pub struct AudioParams {
    master: AtomicU32,
    muted: AtomicBool,
}

impl AudioParams {
    pub fn new(settings: &SettingsDto) -> Self {
        Self {
            master: AtomicU32::new(settings.master_volume.get().to_bits()),
            muted: AtomicBool::new(false),
        }
    }

    pub fn set_master(&self, volume: Volume01) {
        self.master.store(volume.get().to_bits(), Ordering::Relaxed);
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn master(&self) -> f32 {
        f32::from_bits(self.master.load(Ordering::Relaxed))
    }

    pub fn muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Gain applied to every output sample.
    pub fn gain(&self) -> f32 {
        if self.muted() {
            0.0
        } else {
            self.master()
        }
    }
}
