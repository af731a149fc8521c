use std::ops::Range;
use vpiano_ports::samples::Octave;
use vpiano_ports::types::{KeyIndex, KeyLayout};

/// A reference recording and the keys derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OctaveAnchor {
    pub octave: Octave,
    /// Key whose pitch the recording has.
    pub origin: KeyIndex,
    pub keys: Range<KeyIndex>,
}

const fn anchor(octave: Octave, origin: KeyIndex, keys: Range<KeyIndex>) -> OctaveAnchor {
    OctaveAnchor {
        octave,
        origin,
        keys,
    }
}

const FULL_88: [OctaveAnchor; 8] = [
    anchor(Octave::C1, 3, 0..10),
    anchor(Octave::C2, 15, 10..22),
    anchor(Octave::C3, 27, 22..34),
    anchor(Octave::C4, 39, 34..46),
    anchor(Octave::C5, 51, 46..58),
    anchor(Octave::C6, 63, 58..70),
    anchor(Octave::C7, 75, 70..82),
    anchor(Octave::C8, 87, 82..88),
];

const REDUCED_61: [OctaveAnchor; 6] = [
    anchor(Octave::C2, 0, 0..7),
    anchor(Octave::C3, 12, 7..19),
    anchor(Octave::C4, 24, 19..31),
    anchor(Octave::C5, 36, 31..43),
    anchor(Octave::C6, 48, 43..55),
    anchor(Octave::C7, 60, 55..61),
];

pub fn anchors(layout: KeyLayout) -> &'static [OctaveAnchor] {
    match layout {
        KeyLayout::Full88 => &FULL_88,
        KeyLayout::Reduced61 => &REDUCED_61,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorSelection {
    pub octave: Octave,
    /// Signed distance from the anchor's origin pitch.
    pub semitones: i32,
}

/// Finds the anchor whose key range holds `key`.
pub fn select_anchor(layout: KeyLayout, key: KeyIndex) -> Option<AnchorSelection> {
    anchors(layout)
        .iter()
        .find(|anchor| anchor.keys.contains(&key))
        .map(|anchor| AnchorSelection {
            octave: anchor.octave,
            semitones: key as i32 - anchor.origin as i32,
        })
}
