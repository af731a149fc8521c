use pretty_assertions::assert_eq;
use vpiano_domain_keys::{DetectorConfig, KeyDetector, ScreenBuffer};
use vpiano_ports::frame::{OverlaySink, VideoFrame};
use vpiano_ports::storage::KeyGeometry;
use vpiano_ports::types::{Color, Grid, KeyLayout, KeyState};

const WIDTH: usize = 640;
const HEIGHT: usize = 400;
const MIDDLE_C: usize = 39;

fn detector() -> KeyDetector {
    KeyDetector::new(
        KeyLayout::Full88,
        &KeyGeometry::default(),
        DetectorConfig::default(),
    )
}

fn dark_frame() -> VideoFrame {
    Grid::filled(WIDTH, HEIGHT, 0u8)
}

fn light_key(frame: &mut VideoFrame, detector: &KeyDetector, key: usize) {
    for rect in &detector.regions()[key].rects {
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                frame.set(x, y, 0xFF);
            }
        }
    }
}

#[derive(Default)]
struct Recorder {
    mirrored: usize,
    painted: Vec<(i32, i32, i32, i32, Color)>,
    lines: usize,
}

impl OverlaySink for Recorder {
    fn mirror_pixel(&mut self, _x: i32, _y: i32, _pixel: u8) {
        self.mirrored += 1;
    }

    fn paint_region(&mut self, x0: i32, x1: i32, y0: i32, y1: i32, color: Color) {
        self.painted.push((x0, x1, y0, y1, color));
    }

    fn draw_vertical_line(&mut self, _x: i32, _y: i32, _length: i32, _color: Color) {
        self.lines += 1;
    }

    fn draw_horizontal_line(&mut self, _x: i32, _y: i32, _length: i32, _color: Color) {
        self.lines += 1;
    }
}

#[test]
fn lit_key_goes_pressed_held_inactive() {
    let mut detector = detector();
    let mut lit = dark_frame();
    light_key(&mut lit, &detector, MIDDLE_C);
    let mut screen = ScreenBuffer::new(WIDTH, HEIGHT);

    let states = detector.scan(&lit, &mut screen).to_vec();
    assert_eq!(states[MIDDLE_C], KeyState::Pressed);
    assert!(states
        .iter()
        .enumerate()
        .all(|(key, state)| key == MIDDLE_C || *state == KeyState::Inactive));

    assert_eq!(detector.scan(&lit, &mut screen)[MIDDLE_C], KeyState::Held);
    assert_eq!(
        detector.scan(&dark_frame(), &mut screen)[MIDDLE_C],
        KeyState::Inactive
    );
}

#[test]
fn counts_follow_region_area() {
    let mut detector = detector();
    let mut lit = dark_frame();
    light_key(&mut lit, &detector, MIDDLE_C);

    detector.scan(&lit, &mut Recorder::default());
    let area = detector.regions()[MIDDLE_C].area() as u32;
    assert_eq!(detector.bright_counts()[MIDDLE_C], area);
    assert_eq!(detector.bright_counts()[MIDDLE_C + 1], 0);
}

#[test]
fn overlay_calls_per_frame() {
    let mut detector = detector();
    let mut recorder = Recorder::default();
    detector.scan(&dark_frame(), &mut recorder);

    let total_area: i32 = detector.regions().iter().map(|r| r.area()).sum();
    assert_eq!(recorder.mirrored, total_area as usize);
    assert!(recorder.painted.is_empty());
    assert_eq!(recorder.lines, 88 * 3);

    let mut lit = dark_frame();
    light_key(&mut lit, &detector, MIDDLE_C + 1);
    let mut recorder = Recorder::default();
    detector.scan(&lit, &mut recorder);

    let black = &detector.regions()[MIDDLE_C + 1].rects[0];
    assert_eq!(
        recorder.painted,
        vec![(black.x0, black.x1, black.y0, black.y1, Color::RED)]
    );
}

#[test]
fn screen_shows_highlight_and_camera_image() {
    let mut detector = detector();
    let mut lit = dark_frame();
    light_key(&mut lit, &detector, MIDDLE_C);
    let mut screen = ScreenBuffer::new(WIDTH, HEIGHT);
    detector.scan(&lit, &mut screen);

    let tall = detector.regions()[MIDDLE_C].rects[0];
    assert_eq!(screen.pixel(tall.x0 + 2, tall.y0 + 10), Some(Color::GREEN));

    let neighbour = detector.regions()[MIDDLE_C + 2].rects[0];
    assert_eq!(
        screen.pixel(neighbour.x0 + 3, neighbour.y0 + 10),
        Some(Color::from_rgb332(0))
    );

    // outside the keyboard the background is untouched
    assert_eq!(screen.pixel(2, 2), Some(Color::BLUE));
}

#[test]
fn small_frame_reads_as_dark() {
    let mut detector = detector();
    let tiny: VideoFrame = Grid::filled(16, 16, 0xFF);
    let mut recorder = Recorder::default();
    let states = detector.scan(&tiny, &mut recorder);
    assert!(states.iter().all(|s| *s == KeyState::Inactive));
    assert_eq!(recorder.mirrored, 0);
}

#[test]
fn reset_clears_states() {
    let mut detector = detector();
    let mut lit = dark_frame();
    light_key(&mut lit, &detector, 0);
    detector.scan(&lit, &mut Recorder::default());
    assert_eq!(detector.states()[0], KeyState::Pressed);

    detector.reset();
    assert!(detector.states().iter().all(|s| *s == KeyState::Inactive));
}

#[test]
fn config_changes_apply_to_next_scan() {
    let mut detector = detector();
    let mut lit = dark_frame();
    light_key(&mut lit, &detector, MIDDLE_C);

    detector.set_config(DetectorConfig {
        brightness_threshold: 5_000,
        ..DetectorConfig::default()
    });
    assert_eq!(
        detector.scan(&lit, &mut Recorder::default())[MIDDLE_C],
        KeyState::Inactive
    );
}
