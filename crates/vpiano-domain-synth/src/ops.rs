use crate::error::SynthError;
use vpiano_ports::types::Waveform;

fn check_factor(factor: f32) -> Result<(), SynthError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(SynthError::InvalidFactor(factor));
    }
    Ok(())
}

/// Changes speed and pitch together by nearest-index re-sampling.
///
/// `factor > 1` shortens the sound, `factor < 1` lengthens it. The output has
/// `round(len / factor)` samples unless a rounded source index falls past the
/// end of the input, in which case it stops there.
pub fn resample(input: &Waveform, factor: f32) -> Result<Waveform, SynthError> {
    check_factor(factor)?;
    Ok(Waveform::new(resample_slice(input.samples(), factor)))
}

pub(crate) fn resample_slice(input: &[i16], factor: f32) -> Vec<i16> {
    let factor = factor as f64;
    let out_len = (input.len() as f64 / factor).round() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let index = (i as f64 * factor).round() as usize;
        match input.get(index) {
            Some(&sample) => out.push(sample),
            None => break,
        }
    }
    out
}

/// Mixes `b` into `a` starting `offset` samples in.
///
/// The result is `offset + max(b.len(), a.len() - offset)` long; sums that
/// leave the 16-bit range saturate.
pub fn superposition(a: &Waveform, b: &Waveform, offset: usize) -> Waveform {
    let a = a.samples();
    let b = b.samples();
    let len = offset + b.len().max(a.len().saturating_sub(offset));

    let mut out = vec![0i16; len];
    for (slot, &sample) in out.iter_mut().zip(a) {
        *slot = sample;
    }
    for (slot, &sample) in out[offset..].iter_mut().zip(b) {
        *slot = slot.saturating_add(sample);
    }
    Waveform::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_identity() {
        let input = Waveform::new(vec![1, 2, 3, 4]);
        assert_eq!(resample(&input, 1.0).unwrap(), input);
    }

    #[test]
    fn resample_rejects_non_positive_factor() {
        let input = Waveform::new(vec![1, 2, 3]);
        assert!(resample(&input, 0.0).is_err());
        assert!(resample(&input, f32::NAN).is_err());
    }

    #[test]
    fn superposition_of_empty_inputs() {
        let empty = Waveform::default();
        assert_eq!(superposition(&empty, &empty, 3).len(), 3);
    }
}
