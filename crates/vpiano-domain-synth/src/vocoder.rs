//! Phase-vocoder time stretching and the pitch shift built on top of it.

use crate::error::SynthError;
use crate::ops::resample_slice;
use std::f32::consts::{PI, TAU};
use vpiano_ports::fft::{Complex32, FftPort};
use vpiano_ports::types::Waveform;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VocoderParams {
    pub window_size: usize,
    pub hop_size: usize,
    /// Normalised output peaks at `2^headroom_bits`.
    pub headroom_bits: u32,
}

impl Default for VocoderParams {
    fn default() -> Self {
        Self {
            window_size: 1024,
            hop_size: 256,
            headroom_bits: 12,
        }
    }
}

impl VocoderParams {
    pub fn validate(&self, fft: &dyn FftPort) -> Result<(), SynthError> {
        if self.window_size < 2 {
            return Err(SynthError::InvalidWindow(self.window_size));
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(SynthError::InvalidHop {
                hop: self.hop_size,
                window: self.window_size,
            });
        }
        if fft.len() != self.window_size {
            return Err(SynthError::FftSizeMismatch {
                fft: fft.len(),
                window: self.window_size,
            });
        }
        Ok(())
    }

    pub fn peak(&self) -> f32 {
        2f32.powi(self.headroom_bits.min(15) as i32)
    }
}

pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

fn sample_at(samples: &[i16], index: usize) -> f32 {
    samples.get(index).copied().unwrap_or(0) as f32
}

/// Time-scales `input` by `1 / factor` without changing its pitch.
///
/// Pairs of windowed frames `hop_size` apart are read every
/// `hop_size * factor` input samples; the second frame is re-phased with the
/// accumulated per-bin phase advance and overlap-added every `hop_size` output
/// samples. Frames running past the end of the input are zero-padded. The
/// result has `len / factor + window_size` samples, normalised to
/// `params.peak()`.
pub fn stretch(
    input: &Waveform,
    factor: f32,
    params: &VocoderParams,
    fft: &dyn FftPort,
) -> Result<Waveform, SynthError> {
    params.validate(fft)?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(SynthError::InvalidFactor(factor));
    }

    let window_size = params.window_size;
    let hop = params.hop_size;
    let samples = input.samples();

    let window: Vec<f32> = (0..window_size)
        .map(|i| hann_window(i, window_size))
        .collect();
    let mut phase = vec![0.0f32; window_size];
    let mut s1 = vec![Complex32::new(0.0, 0.0); window_size];
    let mut s2 = vec![Complex32::new(0.0, 0.0); window_size];

    let out_len = (samples.len() as f64 / factor as f64) as usize + window_size;
    let mut result = vec![0.0f32; out_len];

    let analysis_hop = hop as f64 * factor as f64;
    let mut frame = 0u64;
    loop {
        let step = frame as f64 * analysis_hop;
        if step >= samples.len() as f64 {
            break;
        }
        frame += 1;

        let start = step as usize;
        for i in 0..window_size {
            s1[i] = Complex32::new(sample_at(samples, start + i) * window[i], 0.0);
            s2[i] = Complex32::new(sample_at(samples, start + hop + i) * window[i], 0.0);
        }

        fft.forward(&mut s1)?;
        fft.forward(&mut s2)?;

        for i in 0..window_size {
            // arg(s2 / s1) without the division
            let advance = (s2[i] * s1[i].conj()).arg();
            phase[i] = (phase[i] + advance).rem_euclid(TAU);
            s2[i] = Complex32::from_polar(s2[i].norm(), phase[i]);
        }

        fft.inverse(&mut s2)?;

        let offset = (step / factor as f64) as usize;
        let Some(dest) = result.get_mut(offset..) else {
            continue;
        };
        for ((slot, value), w) in dest.iter_mut().zip(&s2).zip(&window) {
            *slot += w * value.re;
        }
    }

    Ok(normalize(&result, params.peak()))
}

fn normalize(signal: &[f32], peak: f32) -> Waveform {
    let max = signal.iter().fold(0.0f32, |max, value| max.max(value.abs()));
    if max <= f32::EPSILON {
        return Waveform::silence(signal.len());
    }
    let scale = peak / max;
    Waveform::new(signal.iter().map(|value| (value * scale) as i16).collect())
}

/// Shifts the pitch by `semitones` while keeping the duration.
///
/// Stretches by `1 / 2^(semitones/12)`, drops the first `window_size`
/// samples (the first frame has no overlap partner), then resamples by
/// `2^(semitones/12)`. The output is exactly as long as the input.
pub fn pitchshift(
    input: &Waveform,
    semitones: i32,
    params: &VocoderParams,
    fft: &dyn FftPort,
) -> Result<Waveform, SynthError> {
    let factor = 2f32.powf(semitones as f32 / 12.0);
    let stretched = stretch(input, 1.0 / factor, params, fft)?;

    let warm_up = params.window_size.min(stretched.len());
    let mut shifted = resample_slice(&stretched.samples()[warm_up..], factor);
    shifted.resize(input.len(), 0);
    Ok(Waveform::new(shifted))
}
