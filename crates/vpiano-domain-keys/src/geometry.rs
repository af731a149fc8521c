//! Scan regions and outlines of the projected keyboard.
//!
//! Keys are laid out left to right: white keys sit side by side, each black
//! key straddles the boundary to the right of the white key before it,
//! starting `key_offsets[pitch_class]` pixels left of it. A white key's
//! visible area is therefore split into a tall part between its black
//! neighbours and short parts below them.

use serde::{Deserialize, Serialize};
use vpiano_ports::storage::KeyGeometry;
use vpiano_ports::types::{Color, KeyIndex, KeyLayout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyShape {
    Black,
    /// White key whose right neighbour is black.
    LeftOfBlack,
    /// White key whose left neighbour is black.
    RightOfBlack,
    BetweenBlacks,
    /// White key with no black neighbour, or the last key of a layout
    /// without one.
    Plain,
}

impl KeyShape {
    pub fn is_black(self) -> bool {
        self == KeyShape::Black
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineLine {
    Vertical { x: i32, y: i32, length: i32 },
    Horizontal { x: i32, y: i32, length: i32 },
}

impl OutlineLine {
    fn translate(self, dx: i32, dy: i32) -> Self {
        match self {
            OutlineLine::Vertical { x, y, length } => OutlineLine::Vertical {
                x: x + dx,
                y: y + dy,
                length,
            },
            OutlineLine::Horizontal { x, y, length } => OutlineLine::Horizontal {
                x: x + dx,
                y: y + dy,
                length,
            },
        }
    }
}

/// Everything the detector needs for one key, in frame coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRegion {
    pub key: KeyIndex,
    pub shape: KeyShape,
    /// Disjoint rectangles covering the visible key surface.
    pub rects: Vec<Rect>,
    pub outline: Vec<OutlineLine>,
}

impl KeyRegion {
    pub fn outline_color(&self) -> Color {
        if self.shape.is_black() {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    pub fn active_color(&self) -> Color {
        if self.shape.is_black() {
            Color::RED
        } else {
            Color::GREEN
        }
    }

    pub fn area(&self) -> i32 {
        self.rects.iter().map(Rect::area).sum()
    }
}

fn vline(x: i32, y: i32, length: i32) -> OutlineLine {
    OutlineLine::Vertical { x, y, length }
}

fn hline(x: i32, y: i32, length: i32) -> OutlineLine {
    OutlineLine::Horizontal { x, y, length }
}

fn black_offset(layout: KeyLayout, geometry: &KeyGeometry, key: KeyIndex) -> i32 {
    geometry.key_offsets[layout.pitch_class(key)]
}

/// Computes the regions of every key of `layout`, in key order.
pub fn key_regions(layout: KeyLayout, geometry: &KeyGeometry) -> Vec<KeyRegion> {
    let num_keys = layout.num_keys();
    let ww = geometry.white_key_width;
    let wh = geometry.white_key_height;
    let bw = geometry.black_key_width;
    let bh = geometry.black_key_height;

    let mut regions = Vec::with_capacity(num_keys);
    let mut blacks_before = 0i32;

    for key in 0..num_keys {
        let offset = black_offset(layout, geometry, key);
        let key_x = (key as i32 - blacks_before) * ww;
        let right = key_x + ww;

        let (shape, rects, outline) = if offset != 0 {
            let start = key_x - offset;
            (
                KeyShape::Black,
                vec![Rect::new(start, start + bw, 0, bh)],
                vec![
                    vline(start, 0, bh - 1),
                    vline(start + bw - 1, 0, bh - 1),
                    hline(start, bh - 1, bw),
                ],
            )
        } else {
            let prev = (key > 0)
                .then(|| black_offset(layout, geometry, key - 1))
                .filter(|off| *off != 0);
            let next = (key + 1 < num_keys)
                .then(|| black_offset(layout, geometry, key + 1))
                .filter(|off| *off != 0);

            match (prev, next) {
                (Some(off_prev), Some(off_next)) => {
                    let prev_end = key_x - off_prev + bw;
                    let next_start = right - off_next;
                    (
                        KeyShape::BetweenBlacks,
                        vec![
                            Rect::new(prev_end, next_start, 0, wh),
                            Rect::new(key_x, prev_end, bh, wh),
                            Rect::new(next_start, right, bh, wh),
                        ],
                        vec![
                            vline(key_x, bh, wh - bh),
                            vline(right, bh, wh - bh),
                            hline(key_x, wh, ww),
                        ],
                    )
                }
                (None, Some(off_next)) => {
                    let next_start = right - off_next;
                    (
                        KeyShape::LeftOfBlack,
                        vec![
                            Rect::new(key_x, next_start, 0, wh),
                            Rect::new(next_start, right, bh, wh),
                        ],
                        vec![
                            vline(key_x, 0, wh),
                            vline(right, bh, wh - bh),
                            hline(key_x, wh, ww),
                        ],
                    )
                }
                (Some(off_prev), None) => {
                    let prev_end = key_x - off_prev + bw;
                    (
                        KeyShape::RightOfBlack,
                        vec![
                            Rect::new(prev_end, right, 0, wh),
                            Rect::new(key_x, prev_end, bh, wh),
                        ],
                        vec![
                            vline(key_x, bh, wh - bh),
                            vline(right, 0, wh),
                            hline(key_x, wh, ww),
                        ],
                    )
                }
                (None, None) => (
                    KeyShape::Plain,
                    vec![Rect::new(key_x, right, 0, wh)],
                    vec![vline(key_x, 0, wh), vline(right, 0, wh), hline(key_x, wh, ww)],
                ),
            }
        };

        if shape.is_black() {
            blacks_before += 1;
        }

        let (dx, dy) = (geometry.origin_x, geometry.origin_y);
        regions.push(KeyRegion {
            key,
            shape,
            rects: rects.into_iter().map(|r| r.translate(dx, dy)).collect(),
            outline: outline.into_iter().map(|l| l.translate(dx, dy)).collect(),
        });
    }

    regions
}
