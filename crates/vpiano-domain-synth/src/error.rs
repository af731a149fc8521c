use vpiano_ports::fft::FftError;
use vpiano_ports::samples::{Octave, SampleError};
use vpiano_ports::types::KeyIndex;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("window size must be at least 2, got {0}")]
    InvalidWindow(usize),
    #[error("hop size {hop} must be within 1..={window}")]
    InvalidHop { hop: usize, window: usize },
    #[error("fft size {fft} does not match window size {window}")]
    FftSizeMismatch { fft: usize, window: usize },
    #[error("invalid time/pitch factor: {0}")]
    InvalidFactor(f32),
    #[error("missing reference recording {0}")]
    MissingRecording(Octave),
    #[error("key {0} is outside the layout")]
    KeyOutOfRange(KeyIndex),
    #[error("bank holds {actual} notes, layout needs {expected}")]
    BankSizeMismatch { expected: usize, actual: usize },
    #[error("sample load failed: {0}")]
    Samples(#[from] SampleError),
    #[error("fft failed: {0}")]
    Fft(#[from] FftError),
}
