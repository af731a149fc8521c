use crate::mix_buffer::{MixCursors, MixWriter};
use std::sync::Arc;
use vpiano_domain_synth::SampleBank;
use vpiano_ports::types::{KeyIndex, KeyState, NoteTrigger};

/// A note written into the mix buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggeredNote {
    pub key: KeyIndex,
    /// Write cursor the note starts at.
    pub start: u64,
    pub samples: usize,
}

/// Producer side of the mix: turns key states into notes in the buffer.
pub struct Mixer {
    bank: Arc<SampleBank>,
    writer: MixWriter,
    trigger: NoteTrigger,
}

impl Mixer {
    pub fn new(bank: Arc<SampleBank>, writer: MixWriter, trigger: NoteTrigger) -> Self {
        Self {
            bank,
            writer,
            trigger,
        }
    }

    pub fn trigger(&self) -> NoteTrigger {
        self.trigger
    }

    pub fn set_trigger(&mut self, trigger: NoteTrigger) {
        self.trigger = trigger;
    }

    pub fn cursors(&self) -> MixCursors {
        self.writer.cursors()
    }

    /// Swaps in a fresh buffer, dropping anything pending in the old one.
    pub fn replace_writer(&mut self, writer: MixWriter) -> MixWriter {
        std::mem::replace(&mut self.writer, writer)
    }

    fn fires(&self, state: KeyState) -> bool {
        match self.trigger {
            NoteTrigger::RisingEdge => state == KeyState::Pressed,
            NoteTrigger::WhileActive => state.is_active(),
        }
    }

    /// Writes the note of every key the trigger policy selects, all starting
    /// at the write cursor as it stood when the frame began. Keys without a
    /// note are skipped.
    pub fn mix_frame(&mut self, states: &[KeyState]) -> Vec<TriggeredNote> {
        let start = self.writer.cursors().write;
        let mut triggered = Vec::new();
        for (key, state) in states.iter().enumerate() {
            if !self.fires(*state) {
                continue;
            }
            let Some(note) = self.bank.note(key) else {
                continue;
            };
            let samples = self.writer.add_at(start, note.samples());
            triggered.push(TriggeredNote {
                key,
                start,
                samples,
            });
        }
        triggered
    }
}
