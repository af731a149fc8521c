use pretty_assertions::assert_eq;
use vpiano_domain_synth::{resample, superposition};
use vpiano_ports::types::Waveform;

fn ramp(len: usize) -> Waveform {
    Waveform::new((0..len as i16).collect())
}

#[test]
fn resample_faster_is_monotonic_subsequence() {
    let input = ramp(1000);
    for factor in [1.5f32, 2.0, 2.0f32.powf(7.0 / 12.0), 3.3] {
        let out = resample(&input, factor).unwrap();
        let expected = (1000.0 / factor).floor() as i64;
        assert!(
            (out.len() as i64 - expected).abs() <= 1,
            "factor {factor}: len {} vs {expected}",
            out.len()
        );
        assert!(out.samples().windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn resample_slower_lengthens() {
    let input = ramp(100);
    let out = resample(&input, 0.5).unwrap();
    // index round(199 * 0.5) = 100 is past the end
    assert_eq!(out.len(), 199);
    assert_eq!(&out.samples()[..6], &[0, 1, 1, 2, 2, 3]);
}

#[test]
fn resample_stops_at_input_end() {
    // round(5 / 1.9) = 3 outputs, but index round(2 * 1.9) = 4 is the last valid one
    let input = ramp(5);
    let out = resample(&input, 1.9).unwrap();
    assert_eq!(out.samples(), &[0, 2, 4]);

    // round(3 / 1.4) = 2, indices 0 and 1
    let out = resample(&ramp(3), 1.4).unwrap();
    assert_eq!(out.samples(), &[0, 1]);
}

#[test]
fn superposition_with_silence_is_identity() {
    let a = Waveform::new(vec![5, -3, 7, 100, -32768, 32767]);
    for offset in [0usize, 2, 6, 9] {
        let out = superposition(&a, &Waveform::silence(4), offset);
        assert_eq!(&out.samples()[..a.len()], a.samples());
    }
}

#[test]
fn superposition_length_and_values() {
    let a = Waveform::new(vec![1, 1, 1, 1]);
    let b = Waveform::new(vec![10, 20]);

    let out = superposition(&a, &b, 1);
    assert_eq!(out.samples(), &[1, 11, 21, 1]);

    let out = superposition(&a, &b, 3);
    assert_eq!(out.samples(), &[1, 1, 1, 11, 20]);

    // offset past the end of `a` leaves a silent gap
    let out = superposition(&a, &b, 6);
    assert_eq!(out.samples(), &[1, 1, 1, 1, 0, 0, 10, 20]);
}

#[test]
fn superposition_sum_is_order_independent() {
    let a = Waveform::new(vec![3, -4, 5, 6, 7]);
    let b = Waveform::new(vec![-1, 2, -3]);

    let ab = superposition(&a, &b, 0);
    let ba = superposition(&b, &a, 0);
    assert_eq!(ab, ba);

    // b starting at 2 inside a equals a starting at 0 over a b shifted by 2
    let shifted_b = superposition(&Waveform::silence(2), &b, 2);
    let left = superposition(&a, &b, 2);
    let right = superposition(&shifted_b, &a, 0);
    assert_eq!(left, right);
}

#[test]
fn superposition_saturates() {
    let a = Waveform::new(vec![30_000, -30_000]);
    let b = Waveform::new(vec![10_000, -10_000]);
    let out = superposition(&a, &b, 0);
    assert_eq!(out.samples(), &[i16::MAX, i16::MIN]);
}
