pub use num_complex::Complex32;

#[derive(thiserror::Error, Debug)]
pub enum FftError {
    #[error("invalid transform size: {0}")]
    InvalidSize(usize),
    #[error("buffer length {actual} does not match transform size {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Fixed-size complex DFT. Neither direction normalises; a forward followed by
/// an inverse scales the signal by `len()`.
pub trait FftPort: Send + Sync {
    fn len(&self) -> usize;

    fn forward(&self, buffer: &mut [Complex32]) -> Result<(), FftError>;
    fn inverse(&self, buffer: &mut [Complex32]) -> Result<(), FftError>;
}
