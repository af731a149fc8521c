use crate::mix_buffer::MixReader;
use vpiano_ports::audio::{AudioError, AudioFifoPort};

/// Moves up to `max_samples` samples from the mix buffer into `fifo`, one at a
/// time, while both channels report free space. The mono sample goes to both
/// channels. Returns how many samples were moved.
pub fn drain_to_fifo(
    reader: &mut MixReader,
    fifo: &mut dyn AudioFifoPort,
    max_samples: usize,
) -> Result<usize, AudioError> {
    let mut moved = 0;
    while moved < max_samples {
        let (left, right) = fifo.ready();
        if left == 0 || right == 0 {
            break;
        }
        let sample = reader.pull();
        fifo.write(sample, sample)?;
        moved += 1;
    }
    Ok(moved)
}
