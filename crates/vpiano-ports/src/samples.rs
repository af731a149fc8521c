use crate::types::Waveform;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    #[error("recording not found: {0}")]
    NotFound(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("io error: {0}")]
    Io(String),
}

/// The eight octave anchors a reference recording exists for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Octave {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
}

impl Octave {
    pub const ALL: [Octave; 8] = [
        Octave::C1,
        Octave::C2,
        Octave::C3,
        Octave::C4,
        Octave::C5,
        Octave::C6,
        Octave::C7,
        Octave::C8,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Octave::C1 => "C1",
            Octave::C2 => "C2",
            Octave::C3 => "C3",
            Octave::C4 => "C4",
            Octave::C5 => "C5",
            Octave::C6 => "C6",
            Octave::C7 => "C7",
            Octave::C8 => "C8",
        }
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loads the prerecorded anchor waveforms, once at start-up.
pub trait SampleSourcePort: Send + Sync {
    fn load(&self, octave: Octave) -> Result<Waveform, SampleError>;
}
