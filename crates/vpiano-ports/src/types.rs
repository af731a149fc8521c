use serde::{Deserialize, Serialize};
use std::fmt;

pub type KeyIndex = usize; // 0-based, contiguous over the active layout
pub type SampleTime = u64; // audio sample index, monotonic while stream running

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioOutputDevice {
    pub id: DeviceId,
    pub name: String,
    pub default_config: AudioConfig,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate_hz: u32,
    pub channels: u16, // v1 fixed 2
    pub buffer_size_frames: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume01(pub f32);

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed 16-bit mono audio. The sample count is the vector length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Waveform {
    samples: Vec<i16>,
}

impl Waveform {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}

impl From<Vec<i16>> for Waveform {
    fn from(samples: Vec<i16>) -> Self {
        Self::new(samples)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeyState {
    #[default]
    Inactive,
    Pressed,
    Held,
}

impl KeyState {
    pub fn is_active(self) -> bool {
        !matches!(self, KeyState::Inactive)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    /// A0..C8, anchors C1..C8.
    #[default]
    Full88,
    /// C2..C7, anchors C2..C7.
    Reduced61,
}

impl KeyLayout {
    pub fn num_keys(self) -> usize {
        match self {
            KeyLayout::Full88 => 88,
            KeyLayout::Reduced61 => 61,
        }
    }

    /// Pitch class of key 0, with C = 0.
    pub fn first_pitch_class(self) -> usize {
        match self {
            KeyLayout::Full88 => 9,
            KeyLayout::Reduced61 => 0,
        }
    }

    pub fn pitch_class(self, key: KeyIndex) -> usize {
        (key + self.first_pitch_class()) % 12
    }
}

/// When the mixer writes a key's note into the ring buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NoteTrigger {
    /// Once, on the frame the key enters `Pressed`.
    #[default]
    RisingEdge,
    /// Every frame the key is `Pressed` or `Held`.
    WhileActive,
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)` in keyboard coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

impl Rect {
    pub fn new(x0: i32, x1: i32, y0: i32, y1: i32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).max(0)
    }

    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x0: self.x0 + dx,
            x1: self.x1 + dx,
            y0: self.y0 + dy,
            y1: self.y1 + dy,
        }
    }
}

/// RGB565 screen colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u16);

impl Color {
    pub const BLACK: Color = Color(0x0000);
    pub const WHITE: Color = Color(0xFFFF);
    pub const RED: Color = Color(0xF800);
    pub const GREEN: Color = Color(0x07E0);
    pub const BLUE: Color = Color(0x001F);

    /// Expands a `rrrgggbb` camera pixel to RGB565.
    pub fn from_rgb332(pixel: u8) -> Self {
        let r = ((pixel >> 5) & 0x07) as u16;
        let g = ((pixel >> 2) & 0x07) as u16;
        let b = (pixel & 0x03) as u16;
        let r5 = (r * 31 + 3) / 7;
        let g6 = (g * 63 + 3) / 7;
        let b5 = (b * 31 + 1) / 3;
        Color((r5 << 11) | (g6 << 5) | b5)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let r = (self.0 >> 11) & 0x1F;
        let g = (self.0 >> 5) & 0x3F;
        let b = self.0 & 0x1F;
        [
            ((r * 255 + 15) / 31) as u8,
            ((g * 255 + 31) / 63) as u8,
            ((b * 255 + 15) / 31) as u8,
        ]
    }
}

/// Row-major 2D buffer with bounds-checked access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Returns `None` if `cells` does not hold exactly `width * height` values.
    pub fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.offset(x, y).map(|idx| self.cells[idx])
    }

    /// Writes outside the grid are dropped.
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if let Some(idx) = self.offset(x, y) {
            self.cells[idx] = value;
        }
    }

    pub fn fill(&mut self, value: T) {
        for cell in self.cells.iter_mut() {
            *cell = value;
        }
    }
}
