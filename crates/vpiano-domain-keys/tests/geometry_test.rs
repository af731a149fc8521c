use pretty_assertions::assert_eq;
use vpiano_domain_keys::{key_regions, KeyRegion, KeyShape, OutlineLine};
use vpiano_ports::storage::KeyGeometry;
use vpiano_ports::types::{KeyLayout, Rect};

fn at_origin() -> KeyGeometry {
    KeyGeometry {
        origin_x: 0,
        origin_y: 0,
        ..KeyGeometry::default()
    }
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

fn count_shape(regions: &[KeyRegion], shape: KeyShape) -> usize {
    regions.iter().filter(|r| r.shape == shape).count()
}

#[test]
fn full_keyboard_starts_on_a() {
    let regions = key_regions(KeyLayout::Full88, &at_origin());

    assert_eq!(regions[0].shape, KeyShape::LeftOfBlack);
    assert_eq!(
        regions[0].rects,
        vec![Rect::new(0, 9, 0, 80), Rect::new(9, 12, 50, 80)]
    );
    assert_eq!(
        regions[0].outline,
        vec![
            OutlineLine::Vertical { x: 0, y: 0, length: 80 },
            OutlineLine::Vertical { x: 12, y: 50, length: 30 },
            OutlineLine::Horizontal { x: 0, y: 80, length: 12 },
        ]
    );

    assert_eq!(regions[1].shape, KeyShape::Black);
    assert_eq!(regions[1].rects, vec![Rect::new(9, 17, 0, 50)]);
    assert_eq!(
        regions[1].outline,
        vec![
            OutlineLine::Vertical { x: 9, y: 0, length: 49 },
            OutlineLine::Vertical { x: 16, y: 0, length: 49 },
            OutlineLine::Horizontal { x: 9, y: 49, length: 8 },
        ]
    );

    assert_eq!(regions[2].shape, KeyShape::RightOfBlack);
    assert_eq!(
        regions[2].rects,
        vec![Rect::new(17, 24, 0, 80), Rect::new(12, 17, 50, 80)]
    );
}

#[test]
fn d_sits_between_two_black_keys() {
    let regions = key_regions(KeyLayout::Full88, &at_origin());

    // key 5 is D1: C#1 (offset 6) on the left, D#1 (offset 3) on the right
    assert_eq!(regions[5].shape, KeyShape::BetweenBlacks);
    assert_eq!(
        regions[5].rects,
        vec![
            Rect::new(38, 45, 0, 80),
            Rect::new(36, 38, 50, 80),
            Rect::new(45, 48, 50, 80),
        ]
    );
    assert_eq!(
        regions[5].outline,
        vec![
            OutlineLine::Vertical { x: 36, y: 50, length: 30 },
            OutlineLine::Vertical { x: 48, y: 50, length: 30 },
            OutlineLine::Horizontal { x: 36, y: 80, length: 12 },
        ]
    );
}

#[test]
fn last_key_is_plain() {
    let regions = key_regions(KeyLayout::Full88, &at_origin());
    let last = &regions[87];
    assert_eq!(last.shape, KeyShape::Plain);
    assert_eq!(last.rects, vec![Rect::new(612, 624, 0, 80)]);
}

#[test]
fn key_counts_per_layout() {
    let full = key_regions(KeyLayout::Full88, &at_origin());
    assert_eq!(full.len(), 88);
    assert_eq!(count_shape(&full, KeyShape::Black), 36);

    let reduced = key_regions(KeyLayout::Reduced61, &at_origin());
    assert_eq!(reduced.len(), 61);
    assert_eq!(count_shape(&reduced, KeyShape::Black), 25);
    assert_eq!(reduced[0].shape, KeyShape::LeftOfBlack);
    assert_eq!(reduced[60].shape, KeyShape::Plain);
}

#[test]
fn regions_tile_the_keyboard() {
    let geometry = at_origin();
    for layout in [KeyLayout::Full88, KeyLayout::Reduced61] {
        let regions = key_regions(layout, &geometry);
        let rects: Vec<&Rect> = regions.iter().flat_map(|r| r.rects.iter()).collect();

        for (i, a) in rects.iter().enumerate() {
            assert!(a.area() > 0, "{layout:?}: empty rect {a:?}");
            for b in &rects[i + 1..] {
                assert!(!overlaps(a, b), "{layout:?}: {a:?} overlaps {b:?}");
            }
        }

        let whites = regions.iter().filter(|r| !r.shape.is_black()).count() as i32;
        let total: i32 = regions.iter().map(KeyRegion::area).sum();
        assert_eq!(
            total,
            whites * geometry.white_key_width * geometry.white_key_height,
            "{layout:?}"
        );
    }
}

#[test]
fn origin_shifts_everything() {
    let shifted = key_regions(KeyLayout::Full88, &KeyGeometry::default());
    let plain = key_regions(KeyLayout::Full88, &at_origin());
    for (a, b) in shifted.iter().zip(&plain) {
        let moved: Vec<Rect> = b.rects.iter().map(|r| r.translate(8, 300)).collect();
        assert_eq!(a.rects, moved);
    }
}
