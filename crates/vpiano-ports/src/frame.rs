use crate::types::{Color, Grid};

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("frame source not found: {0}")]
    NotFound(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Read access to the current camera frame, one encoded byte per pixel.
pub trait FrameSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// `None` outside the frame.
    fn read_pixel(&self, x: i32, y: i32) -> Option<u8>;
}

/// Drawing primitives over the off-screen display buffer.
pub trait OverlaySink {
    /// Copies a scanned camera pixel to the display.
    fn mirror_pixel(&mut self, x: i32, y: i32, pixel: u8);

    /// Fills `[x0, x1) x [y0, y1)`.
    fn paint_region(&mut self, x0: i32, x1: i32, y0: i32, y1: i32, color: Color);

    fn draw_vertical_line(&mut self, x: i32, y: i32, length: i32, color: Color);
    fn draw_horizontal_line(&mut self, x: i32, y: i32, length: i32, color: Color);
}

/// RGB332 camera frame.
pub type VideoFrame = Grid<u8>;

impl FrameSource for VideoFrame {
    fn width(&self) -> usize {
        Grid::width(self)
    }

    fn height(&self) -> usize {
        Grid::height(self)
    }

    fn read_pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.get(x, y)
    }
}

/// Supplies successive camera frames.
pub trait FramePort: Send {
    /// `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError>;
}
