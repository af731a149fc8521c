use vpiano_ports::frame::OverlaySink;
use vpiano_ports::types::{Color, Grid};

/// Off-screen RGB565 display buffer the detector draws into.
#[derive(Clone, Debug)]
pub struct ScreenBuffer {
    pixels: Grid<Color>,
}

impl ScreenBuffer {
    /// A buffer cleared to the background colour.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: Grid::filled(width, height, Color::BLUE),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Color::BLUE);
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.pixels.get(x, y)
    }

    pub fn pixels(&self) -> &Grid<Color> {
        &self.pixels
    }
}

impl OverlaySink for ScreenBuffer {
    fn mirror_pixel(&mut self, x: i32, y: i32, pixel: u8) {
        self.pixels.set(x, y, Color::from_rgb332(pixel));
    }

    fn paint_region(&mut self, x0: i32, x1: i32, y0: i32, y1: i32, color: Color) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.pixels.width() as i32);
        let y1 = y1.min(self.pixels.height() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.set(x, y, color);
            }
        }
    }

    fn draw_vertical_line(&mut self, x: i32, y: i32, length: i32, color: Color) {
        for dy in 0..length.max(0) {
            self.pixels.set(x, y + dy, color);
        }
    }

    fn draw_horizontal_line(&mut self, x: i32, y: i32, length: i32, color: Color) {
        for dx in 0..length.max(0) {
            self.pixels.set(x + dx, y, color);
        }
    }
}
