use vpiano_ports::types::KeyState;

/// One hysteresis step for a key lit by `bright_count` pixels.
///
/// A key drops out at or below `threshold - margin`, and only an inactive key
/// crossing `threshold + margin` fires. A `Pressed` key that stays lit is
/// `Held` on the next frame, so `Pressed` never lasts more than one frame.
pub fn next_state(current: KeyState, bright_count: u32, threshold: u32, margin: u32) -> KeyState {
    if bright_count <= threshold.saturating_sub(margin) {
        KeyState::Inactive
    } else if current == KeyState::Pressed {
        KeyState::Held
    } else if current == KeyState::Inactive && bright_count > threshold.saturating_add(margin) {
        KeyState::Pressed
    } else {
        current
    }
}
