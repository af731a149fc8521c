use crate::geometry::{key_regions, KeyRegion, OutlineLine};
use crate::luminance::is_bright;
use crate::state::next_state;
use serde::{Deserialize, Serialize};
use vpiano_ports::frame::{FrameSource, OverlaySink};
use vpiano_ports::storage::{KeyGeometry, SettingsDto};
use vpiano_ports::types::{KeyLayout, KeyState};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Lit-pixel count `T` around which a key switches.
    pub brightness_threshold: u32,
    /// Guard band `M` on each side of `T`.
    pub hysteresis_margin: u32,
    /// A pixel counts as lit above this luminance.
    pub luminance_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 30,
            hysteresis_margin: 10,
            luminance_threshold: 0.79,
        }
    }
}

impl From<&SettingsDto> for DetectorConfig {
    fn from(settings: &SettingsDto) -> Self {
        Self {
            brightness_threshold: settings.brightness_threshold,
            hysteresis_margin: settings.hysteresis_margin,
            luminance_threshold: settings.luminance_threshold,
        }
    }
}

/// Per-key activity tracking over successive camera frames.
pub struct KeyDetector {
    config: DetectorConfig,
    regions: Vec<KeyRegion>,
    states: Vec<KeyState>,
    counts: Vec<u32>,
}

impl KeyDetector {
    pub fn new(layout: KeyLayout, geometry: &KeyGeometry, config: DetectorConfig) -> Self {
        let regions = key_regions(layout, geometry);
        let num_keys = regions.len();
        Self {
            config,
            regions,
            states: vec![KeyState::Inactive; num_keys],
            counts: vec![0; num_keys],
        }
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    pub fn set_config(&mut self, config: DetectorConfig) {
        self.config = config;
    }

    pub fn regions(&self) -> &[KeyRegion] {
        &self.regions
    }

    pub fn states(&self) -> &[KeyState] {
        &self.states
    }

    /// Lit-pixel counts measured by the last scan.
    pub fn bright_counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn reset(&mut self) {
        self.states.fill(KeyState::Inactive);
        self.counts.fill(0);
    }

    /// Runs one detection pass over `frame`.
    ///
    /// Every scanned pixel is mirrored to `overlay`; active keys are then
    /// filled with their highlight colour and all outlines are redrawn.
    pub fn scan(&mut self, frame: &dyn FrameSource, overlay: &mut dyn OverlaySink) -> &[KeyState] {
        let config = self.config;
        for ((region, state), count) in self
            .regions
            .iter()
            .zip(self.states.iter_mut())
            .zip(self.counts.iter_mut())
        {
            *count = count_bright(region, frame, overlay, config.luminance_threshold);
            *state = next_state(
                *state,
                *count,
                config.brightness_threshold,
                config.hysteresis_margin,
            );

            if state.is_active() {
                let color = region.active_color();
                for rect in &region.rects {
                    overlay.paint_region(rect.x0, rect.x1, rect.y0, rect.y1, color);
                }
            }

            let color = region.outline_color();
            for line in &region.outline {
                match *line {
                    OutlineLine::Vertical { x, y, length } => {
                        overlay.draw_vertical_line(x, y, length, color)
                    }
                    OutlineLine::Horizontal { x, y, length } => {
                        overlay.draw_horizontal_line(x, y, length, color)
                    }
                }
            }
        }
        &self.states
    }
}

fn count_bright(
    region: &KeyRegion,
    frame: &dyn FrameSource,
    overlay: &mut dyn OverlaySink,
    threshold: f32,
) -> u32 {
    let mut count = 0;
    for rect in &region.rects {
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                let Some(pixel) = frame.read_pixel(x, y) else {
                    continue;
                };
                overlay.mirror_pixel(x, y, pixel);
                if is_bright(pixel, threshold) {
                    count += 1;
                }
            }
        }
    }
    count
}
