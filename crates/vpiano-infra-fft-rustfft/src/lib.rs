use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use vpiano_ports::fft::{Complex32, FftError, FftPort};

pub struct RustFftPort {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl RustFftPort {
    pub fn new(len: usize) -> Result<Self, FftError> {
        if len == 0 {
            return Err(FftError::InvalidSize(len));
        }
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Ok(Self {
            len,
            forward,
            inverse,
        })
    }

    fn check(&self, buffer: &[Complex32]) -> Result<(), FftError> {
        if buffer.len() != self.len {
            return Err(FftError::LengthMismatch {
                expected: self.len,
                actual: buffer.len(),
            });
        }
        Ok(())
    }
}

impl FftPort for RustFftPort {
    fn len(&self) -> usize {
        self.len
    }

    fn forward(&self, buffer: &mut [Complex32]) -> Result<(), FftError> {
        self.check(buffer)?;
        self.forward.process(buffer);
        Ok(())
    }

    fn inverse(&self, buffer: &mut [Complex32]) -> Result<(), FftError> {
        self.check(buffer)?;
        self.inverse.process(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_size() {
        assert!(matches!(RustFftPort::new(0), Err(FftError::InvalidSize(0))));
    }

    #[test]
    fn forward_then_inverse_scales_by_len() {
        let fft = RustFftPort::new(8).unwrap();
        let mut buffer: Vec<Complex32> = (0..8).map(|i| Complex32::new(i as f32, 0.0)).collect();
        fft.forward(&mut buffer).unwrap();
        fft.inverse(&mut buffer).unwrap();
        for (i, value) in buffer.iter().enumerate() {
            assert!((value.re - 8.0 * i as f32).abs() < 1e-3);
            assert!(value.im.abs() < 1e-3);
        }
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let fft = RustFftPort::new(8).unwrap();
        let mut buffer = vec![Complex32::new(0.0, 0.0); 4];
        assert!(matches!(
            fft.forward(&mut buffer),
            Err(FftError::LengthMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }
}
