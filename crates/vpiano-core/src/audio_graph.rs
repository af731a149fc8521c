use crate::audio_params::AudioParams;
use crate::mix_buffer::MixReader;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use vpiano_ports::audio::AudioRenderCallback;
use vpiano_ports::types::SampleTime;

/// Output position of the open stream: one past the last frame rendered.
/// Compared with the mix buffer's read cursor it shows whether the device is
/// still pulling.
#[derive(Default)]
pub struct StreamClock(AtomicU64);

impl StreamClock {
    pub fn advance_to(&self, sample_time: SampleTime) {
        self.0.store(sample_time, Ordering::Relaxed);
    }

    pub fn sample_time(&self) -> SampleTime {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drains the mix buffer into a stereo output stream, the same mono signal on
/// both channels.
pub struct AudioGraph {
    reader: MixReader,
    params: Arc<AudioParams>,
    clock: Arc<StreamClock>,
}

impl AudioGraph {
    pub fn new(reader: MixReader, params: Arc<AudioParams>, clock: Arc<StreamClock>) -> Self {
        Self {
            reader,
            params,
            clock,
        }
    }
}

impl AudioRenderCallback for AudioGraph {
    fn render(&mut self, sample_time_start: SampleTime, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = out_l.len().min(out_r.len());
        let gain = self.params.gain() / i16::MAX as f32;

        for (left, right) in out_l.iter_mut().zip(out_r.iter_mut()) {
            let value = (self.reader.pull() as f32 * gain).clamp(-1.0, 1.0);
            *left = value;
            *right = value;
        }

        self.clock.advance_to(sample_time_start.saturating_add(frames as u64));
    }
}
