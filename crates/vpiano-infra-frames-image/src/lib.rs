use image::{ImageError, Rgb, RgbImage};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vpiano_ports::frame::{FrameError, FramePort, VideoFrame};
use vpiano_ports::types::{Color, Grid};

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "ppm"];

/// Packs an 8-bit RGB pixel into the camera's `rrrgggbb` format.
pub fn rgb8_to_rgb332([r, g, b]: [u8; 3]) -> u8 {
    (r & 0xE0) | ((g >> 3) & 0x1C) | (b >> 6)
}

fn map_image(err: ImageError) -> FrameError {
    match err {
        ImageError::IoError(e) => FrameError::Io(e.to_string()),
        other => FrameError::Decode(other.to_string()),
    }
}

pub fn load_frame(path: &Path) -> Result<VideoFrame, FrameError> {
    let rgb = image::open(path).map_err(map_image)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let cells = rgb.pixels().map(|p| rgb8_to_rgb332(p.0)).collect();
    Grid::from_cells(width as usize, height as usize, cells)
        .ok_or_else(|| FrameError::Decode(format!("{}: bad dimensions", path.display())))
}

/// Plays a directory of still images, in file-name order, as a video stream.
pub struct ImageDirFrameSource {
    pending: VecDeque<PathBuf>,
}

impl ImageDirFrameSource {
    pub fn open(dir: &Path) -> Result<Self, FrameError> {
        if !dir.is_dir() {
            return Err(FrameError::NotFound(dir.display().to_string()));
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| FrameError::Io(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        info!(dir = %dir.display(), frames = paths.len(), "frame directory opened");
        Ok(Self {
            pending: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FramePort for ImageDirFrameSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        debug!(path = %path.display(), "loading frame");
        load_frame(&path).map(Some)
    }
}

/// Writes the display buffer to an image file; the format follows the
/// extension.
pub fn save_screen(path: &Path, screen: &Grid<Color>) -> Result<(), FrameError> {
    let mut image = RgbImage::new(screen.width() as u32, screen.height() as u32);
    for (pixel, color) in image.pixels_mut().zip(screen.cells()) {
        *pixel = Rgb(color.to_rgb8());
    }
    image.save(path).map_err(map_image)
}
