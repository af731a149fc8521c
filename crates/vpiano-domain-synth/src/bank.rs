use crate::anchors::{anchors, select_anchor};
use crate::error::SynthError;
use crate::vocoder::{pitchshift, VocoderParams};
use std::sync::Arc;
use vpiano_ports::fft::FftPort;
use vpiano_ports::samples::{Octave, SampleSourcePort};
use vpiano_ports::types::{KeyIndex, KeyLayout, Waveform};

/// The immutable anchor recordings, shared read-only by every synthesis call.
#[derive(Clone, Debug, Default)]
pub struct ReferenceSamples {
    recordings: [Option<Arc<Waveform>>; 8],
}

impl ReferenceSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the recordings `layout` needs.
    pub fn load(source: &dyn SampleSourcePort, layout: KeyLayout) -> Result<Self, SynthError> {
        let mut samples = Self::new();
        for anchor in anchors(layout) {
            let waveform = source.load(anchor.octave)?;
            samples.insert(anchor.octave, waveform);
        }
        Ok(samples)
    }

    pub fn insert(&mut self, octave: Octave, waveform: Waveform) {
        self.recordings[octave.index()] = Some(Arc::new(waveform));
    }

    pub fn get(&self, octave: Octave) -> Option<&Arc<Waveform>> {
        self.recordings[octave.index()].as_ref()
    }
}

/// Every key's pitched waveform, computed once at start-up.
#[derive(Debug)]
pub struct SampleBank {
    layout: KeyLayout,
    notes: Vec<Waveform>,
}

impl SampleBank {
    /// Builds the bank in ascending key order.
    pub fn build(
        layout: KeyLayout,
        references: &ReferenceSamples,
        params: &VocoderParams,
        fft: &dyn FftPort,
    ) -> Result<Self, SynthError> {
        Self::build_with(layout, references, params, fft, |_, _| {})
    }

    /// Like [`SampleBank::build`], reporting each finished key.
    pub fn build_with(
        layout: KeyLayout,
        references: &ReferenceSamples,
        params: &VocoderParams,
        fft: &dyn FftPort,
        mut on_key: impl FnMut(KeyIndex, &Waveform),
    ) -> Result<Self, SynthError> {
        params.validate(fft)?;

        let mut notes = Vec::with_capacity(layout.num_keys());
        for key in 0..layout.num_keys() {
            let selection = select_anchor(layout, key).ok_or(SynthError::KeyOutOfRange(key))?;
            let origin = references
                .get(selection.octave)
                .ok_or(SynthError::MissingRecording(selection.octave))?;
            let note = pitchshift(origin, selection.semitones, params, fft)?;
            on_key(key, &note);
            notes.push(note);
        }

        Ok(Self { layout, notes })
    }

    /// Wraps already synthesized notes, one per key of `layout`.
    pub fn from_notes(layout: KeyLayout, notes: Vec<Waveform>) -> Result<Self, SynthError> {
        if notes.len() != layout.num_keys() {
            return Err(SynthError::BankSizeMismatch {
                expected: layout.num_keys(),
                actual: notes.len(),
            });
        }
        Ok(Self { layout, notes })
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, key: KeyIndex) -> Option<&Waveform> {
        self.notes.get(key)
    }
}
