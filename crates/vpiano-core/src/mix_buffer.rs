//! Fixed-size circular mix buffer shared by one writer and one reader.
//!
//! The writer adds notes into the region ahead of the reader; the reader
//! takes one sample at a time and clears the slot behind it, so every slot
//! the writer reaches again starts from silence. No lock is taken on either
//! side. The writer starts `write_lead` samples ahead of the read cursor and
//! never writes more than the rest of one buffer length past that point.

use serde::Serialize;
use std::sync::atomic::{AtomicI16, AtomicU64, Ordering};
use std::sync::Arc;
use vpiano_ports::types::SampleTime;

struct Shared {
    samples: Box<[AtomicI16]>,
    read_cursor: AtomicU64,
}

impl Shared {
    fn slot(&self, cursor: SampleTime) -> &AtomicI16 {
        &self.samples[(cursor % self.samples.len() as u64) as usize]
    }
}

/// Read and write positions, in samples since the buffer was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MixCursors {
    pub read: SampleTime,
    pub write: SampleTime,
}

pub struct MixBuffer;

impl MixBuffer {
    /// Creates a silent buffer of `len` samples (at least one) and splits it.
    /// `write_lead` is clamped below `len`.
    pub fn new(len: usize, write_lead: usize) -> (MixWriter, MixReader) {
        let len = len.max(1);
        let samples: Box<[AtomicI16]> = (0..len).map(|_| AtomicI16::new(0)).collect();
        let shared = Arc::new(Shared {
            samples,
            read_cursor: AtomicU64::new(0),
        });
        (
            MixWriter {
                shared: shared.clone(),
                write_lead: write_lead.min(len - 1),
            },
            MixReader { shared },
        )
    }
}

/// Producer half: adds notes ahead of the reader.
pub struct MixWriter {
    shared: Arc<Shared>,
    write_lead: usize,
}

impl MixWriter {
    pub fn len(&self) -> usize {
        self.shared.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.samples.is_empty()
    }

    /// Longest note the writer accepts in one call.
    pub fn capacity(&self) -> usize {
        self.len() - self.write_lead
    }

    pub fn cursors(&self) -> MixCursors {
        let read = self.shared.read_cursor.load(Ordering::Acquire);
        MixCursors {
            read,
            write: read + self.write_lead as u64,
        }
    }

    /// Adds `samples` on top of whatever is pending, starting at the write
    /// cursor. Sums saturate at the 16-bit range. Returns the number of
    /// samples written, which is short only when `samples` exceeds
    /// [`MixWriter::capacity`].
    pub fn add(&mut self, samples: &[i16]) -> usize {
        let start = self.cursors().write;
        self.add_at(start, samples)
    }

    /// Like [`MixWriter::add`] but from a cursor taken earlier, so notes
    /// started together stay aligned while the reader moves. A start the
    /// reader has already passed is moved up to the read cursor, and the
    /// write never reaches past the slot the reader will take next lap.
    pub fn add_at(&mut self, start: SampleTime, samples: &[i16]) -> usize {
        let read = self.shared.read_cursor.load(Ordering::Acquire);
        let start = start.max(read);
        let room = (read + self.len() as u64).saturating_sub(start) as usize;
        let count = samples.len().min(self.capacity()).min(room);
        for (i, &sample) in samples[..count].iter().enumerate() {
            // the closure never returns None
            let _ = self.shared.slot(start + i as u64).fetch_update(
                Ordering::AcqRel,
                Ordering::Acquire,
                |pending| Some(pending.saturating_add(sample)),
            );
        }
        count
    }
}

/// Consumer half: drains one sample per call at the output rate.
pub struct MixReader {
    shared: Arc<Shared>,
}

impl MixReader {
    pub fn read_cursor(&self) -> SampleTime {
        self.shared.read_cursor.load(Ordering::Acquire)
    }

    /// Takes the sample under the read cursor, leaves silence in its place
    /// and advances.
    pub fn pull(&mut self) -> i16 {
        let cursor = self.shared.read_cursor.load(Ordering::Relaxed);
        let sample = self.shared.slot(cursor).swap(0, Ordering::AcqRel);
        self.shared.read_cursor.store(cursor + 1, Ordering::Release);
        sample
    }

    pub fn pull_into(&mut self, out: &mut [i16]) {
        for slot in out.iter_mut() {
            *slot = self.pull();
        }
    }
}
