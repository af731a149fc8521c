/// Relative luminance of an RGB332 pixel, in `0.0..=1.0`.
pub fn luminance(pixel: u8) -> f32 {
    let r = ((pixel >> 5) & 0x07) as f32 / 7.0;
    let g = ((pixel >> 2) & 0x07) as f32 / 7.0;
    let b = (pixel & 0x03) as f32 / 3.0;
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

pub fn is_bright(pixel: u8, threshold: f32) -> bool {
    luminance(pixel) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes() {
        assert_eq!(luminance(0x00), 0.0);
        assert!((luminance(0xFF) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn green_dominates() {
        let red = 0b111_000_00;
        let green = 0b000_111_00;
        let blue = 0b000_000_11;
        assert!(luminance(green) > luminance(red));
        assert!(luminance(red) > luminance(blue));
    }

    #[test]
    fn default_threshold_needs_near_white() {
        assert!(is_bright(0xFF, 0.79));
        // full green alone is 0.7152
        assert!(!is_bright(0b000_111_00, 0.79));
        assert!(!is_bright(0b101_101_10, 0.79));
    }
}
