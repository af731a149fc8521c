use pretty_assertions::assert_eq;
use vpiano_domain_synth::{
    anchors, select_anchor, ReferenceSamples, SampleBank, SynthError, VocoderParams,
};
use vpiano_infra_fft_rustfft::RustFftPort;
use vpiano_ports::samples::{Octave, SampleError, SampleSourcePort};
use vpiano_ports::types::{KeyLayout, Waveform};

const LAYOUTS: [KeyLayout; 2] = [KeyLayout::Full88, KeyLayout::Reduced61];

#[test]
fn anchors_partition_every_layout() {
    for layout in LAYOUTS {
        let table = anchors(layout);
        assert_eq!(table.first().map(|a| a.keys.start), Some(0));
        assert_eq!(table.last().map(|a| a.keys.end), Some(layout.num_keys()));
        for pair in table.windows(2) {
            assert_eq!(pair[0].keys.end, pair[1].keys.start);
        }

        for key in 0..layout.num_keys() {
            let owners = table.iter().filter(|a| a.keys.contains(&key)).count();
            assert_eq!(owners, 1, "{layout:?} key {key}");

            let selection = select_anchor(layout, key).unwrap();
            assert!(
                (-5..=6).contains(&selection.semitones),
                "{layout:?} key {key}: {} semitones",
                selection.semitones
            );
        }
        assert_eq!(select_anchor(layout, layout.num_keys()), None);
    }
}

#[test]
fn full_layout_uses_every_recording() {
    let octaves: Vec<Octave> = anchors(KeyLayout::Full88).iter().map(|a| a.octave).collect();
    assert_eq!(octaves, Octave::ALL.to_vec());
    assert_eq!(anchors(KeyLayout::Reduced61).len(), 6);
}

#[test]
fn anchor_origins_are_c_keys() {
    for layout in LAYOUTS {
        for anchor in anchors(layout) {
            assert_eq!(layout.pitch_class(anchor.origin), 0, "{:?}", anchor.octave);
        }
    }
}

#[test]
fn known_key_selections() {
    let a0 = select_anchor(KeyLayout::Full88, 0).unwrap();
    assert_eq!((a0.octave, a0.semitones), (Octave::C1, -3));

    let middle_c = select_anchor(KeyLayout::Full88, 39).unwrap();
    assert_eq!((middle_c.octave, middle_c.semitones), (Octave::C4, 0));

    let f_sharp = select_anchor(KeyLayout::Full88, 45).unwrap();
    assert_eq!((f_sharp.octave, f_sharp.semitones), (Octave::C4, 6));

    let g = select_anchor(KeyLayout::Full88, 46).unwrap();
    assert_eq!((g.octave, g.semitones), (Octave::C5, -5));

    let top = select_anchor(KeyLayout::Reduced61, 60).unwrap();
    assert_eq!((top.octave, top.semitones), (Octave::C7, 0));
}

struct ToneSource;

impl SampleSourcePort for ToneSource {
    fn load(&self, octave: Octave) -> Result<Waveform, SampleError> {
        let step = 0.05 * (octave.index() + 1) as f32;
        Ok(Waveform::new(
            (0..400)
                .map(|i| (1_000.0 * (i as f32 * step).sin()) as i16)
                .collect(),
        ))
    }
}

fn small_params() -> VocoderParams {
    VocoderParams {
        window_size: 64,
        hop_size: 16,
        headroom_bits: 12,
    }
}

#[test]
fn bank_has_one_note_per_key() {
    let fft = RustFftPort::new(64).unwrap();
    for layout in LAYOUTS {
        let refs = ReferenceSamples::load(&ToneSource, layout).unwrap();
        let mut reported = Vec::new();
        let bank = SampleBank::build_with(layout, &refs, &small_params(), &fft, |key, _| {
            reported.push(key)
        })
        .unwrap();

        assert_eq!(bank.len(), layout.num_keys());
        assert_eq!(reported, (0..layout.num_keys()).collect::<Vec<_>>());
        for key in 0..layout.num_keys() {
            assert_eq!(bank.note(key).map(Waveform::len), Some(400));
        }
        assert!(bank.note(layout.num_keys()).is_none());
    }
}

#[test]
fn bank_reports_missing_recording() {
    let fft = RustFftPort::new(64).unwrap();
    let mut refs = ReferenceSamples::new();
    for octave in [Octave::C2, Octave::C3, Octave::C4, Octave::C5, Octave::C6] {
        refs.insert(octave, ToneSource.load(octave).unwrap());
    }

    let err = SampleBank::build(KeyLayout::Reduced61, &refs, &small_params(), &fft).unwrap_err();
    assert!(matches!(err, SynthError::MissingRecording(Octave::C7)));
}

#[test]
fn bank_from_notes_checks_size() {
    let notes = vec![Waveform::silence(4); 60];
    let err = SampleBank::from_notes(KeyLayout::Reduced61, notes).unwrap_err();
    assert!(matches!(
        err,
        SynthError::BankSizeMismatch {
            expected: 61,
            actual: 60
        }
    ));
}
