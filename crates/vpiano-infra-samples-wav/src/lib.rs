//! WAV file adapters: anchor recordings in, rendered audio out.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;
use vpiano_ports::audio::{AudioError, AudioFifoPort};
use vpiano_ports::samples::{Octave, SampleError, SampleSourcePort};
use vpiano_ports::types::Waveform;

/// Free slots the file sink reports on each channel.
pub const FIFO_DEPTH: usize = 128;

/// Reads `C1.wav` … `C8.wav` from one directory. Every recording must be
/// at the session sample rate.
pub struct WavSampleSource {
    dir: PathBuf,
    sample_rate_hz: u32,
}

impl WavSampleSource {
    pub fn new(dir: impl Into<PathBuf>, sample_rate_hz: u32) -> Self {
        Self {
            dir: dir.into(),
            sample_rate_hz,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn path_for(&self, octave: Octave) -> PathBuf {
        self.dir.join(format!("{}.wav", octave.name()))
    }
}

impl SampleSourcePort for WavSampleSource {
    fn load(&self, octave: Octave) -> Result<Waveform, SampleError> {
        let path = self.path_for(octave);
        if !path.exists() {
            return Err(SampleError::NotFound(path.display().to_string()));
        }
        let (waveform, rate) = read_wav(&path)?;
        if rate != self.sample_rate_hz {
            return Err(SampleError::UnsupportedFormat(format!(
                "{} is {rate} Hz, expected {} Hz",
                path.display(),
                self.sample_rate_hz
            )));
        }
        debug!(%octave, samples = waveform.len(), path = %path.display(), "recording loaded");
        Ok(waveform)
    }
}

fn map_hound(err: hound::Error) -> SampleError {
    match err {
        hound::Error::IoError(e) => SampleError::Io(e.to_string()),
        other => SampleError::UnsupportedFormat(other.to_string()),
    }
}

/// Decodes a WAV file to 16-bit mono, averaging the channels.
pub fn read_waveform(path: &Path) -> Result<Waveform, SampleError> {
    read_wav(path).map(|(waveform, _)| waveform)
}

/// Like [`read_waveform`], also returning the file's sample rate.
pub fn read_wav(path: &Path) -> Result<(Waveform, u32), SampleError> {
    let mut reader = WavReader::open(path).map_err(map_hound)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<i32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ 1..=32) => {
            let shift = bits as i32 - 16;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            v >> shift
                        } else {
                            v << -shift
                        }
                    })
                })
                .collect::<Result<_, _>>()
                .map_err(map_hound)?
        }
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i32))
            .collect::<Result<_, _>>()
            .map_err(map_hound)?,
        (format, bits) => {
            return Err(SampleError::UnsupportedFormat(format!(
                "{format:?} with {bits} bits per sample"
            )))
        }
    };

    let samples = interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().sum();
            (sum / channels as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
        })
        .collect();
    Ok((Waveform::new(samples), spec.sample_rate))
}

fn pcm16_spec(sample_rate_hz: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Writes `waveform` as a 16-bit mono WAV file.
pub fn write_waveform(
    path: &Path,
    waveform: &Waveform,
    sample_rate_hz: u32,
) -> Result<(), SampleError> {
    let mut writer = WavWriter::create(path, pcm16_spec(sample_rate_hz, 1)).map_err(map_hound)?;
    for &sample in waveform.samples() {
        writer.write_sample(sample).map_err(map_hound)?;
    }
    writer.finalize().map_err(map_hound)
}

/// Stereo 16-bit WAV file standing in for the codec FIFO. It never fills up.
pub struct WavFifoSink {
    writer: WavWriter<BufWriter<File>>,
    frames: u64,
}

impl WavFifoSink {
    pub fn create(path: &Path, sample_rate_hz: u32) -> Result<Self, SampleError> {
        let writer = WavWriter::create(path, pcm16_spec(sample_rate_hz, 2)).map_err(map_hound)?;
        Ok(Self { writer, frames: 0 })
    }

    pub fn finalize(self) -> Result<u64, SampleError> {
        self.writer.finalize().map_err(map_hound)?;
        Ok(self.frames)
    }
}

impl AudioFifoPort for WavFifoSink {
    fn ready(&mut self) -> (usize, usize) {
        (FIFO_DEPTH, FIFO_DEPTH)
    }

    fn write(&mut self, left: i16, right: i16) -> Result<(), AudioError> {
        self.writer
            .write_sample(left)
            .and_then(|_| self.writer.write_sample(right))
            .map_err(|e| AudioError::Backend(e.to_string()))?;
        self.frames += 1;
        Ok(())
    }
}
