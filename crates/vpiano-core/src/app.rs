use crate::audio_graph::{AudioGraph, StreamClock};
use crate::audio_params::AudioParams;
use crate::diagnostics::{export_diagnostics, DiagnosticsSnapshot};
use crate::ipc::{Command, Event};
use crate::mix_buffer::{MixBuffer, MixCursors, MixReader};
use crate::mixer::Mixer;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vpiano_domain_keys::{DetectorConfig, KeyDetector, ScreenBuffer};
use vpiano_domain_synth::{anchors, ReferenceSamples, SampleBank, SynthError, VocoderParams};
use vpiano_ports::audio::{AudioError, AudioOutputPort, AudioStreamHandle};
use vpiano_ports::fft::FftPort;
use vpiano_ports::frame::FrameSource;
use vpiano_ports::samples::SampleSourcePort;
use vpiano_ports::storage::{SettingsDto, StorageError, StoragePort};
use vpiano_ports::types::{AudioConfig, DeviceId, KeyLayout, KeyState, SampleTime};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("synth error: {0}")]
    Synth(#[from] SynthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("sample bank is for {bank:?} but settings select {settings:?}")]
    LayoutMismatch { bank: KeyLayout, settings: KeyLayout },
    #[error("no audio output port configured")]
    NoAudioPort,
}

pub fn vocoder_params(settings: &SettingsDto) -> VocoderParams {
    VocoderParams {
        window_size: settings.window_size,
        hop_size: settings.hop_size,
        headroom_bits: settings.normalize_headroom_bits,
    }
}

/// Loads the anchor recordings and pitch-shifts one note per key.
pub fn build_bank(
    settings: &SettingsDto,
    source: &dyn SampleSourcePort,
    fft: &dyn FftPort,
) -> Result<SampleBank, AppError> {
    let layout = settings.key_layout;
    let params = vocoder_params(settings);
    params.validate(fft)?;

    info!(?layout, "loading reference recordings");
    let references = ReferenceSamples::load(source, layout)?;

    let bank = SampleBank::build_with(layout, &references, &params, fft, |key, note| {
        debug!(key, samples = note.len(), "note synthesized");
        if let Some(anchor) = anchors(layout).iter().find(|a| a.keys.end == key + 1) {
            info!(octave = %anchor.octave, keys = ?anchor.keys, "anchor done");
        }
    })?;
    info!(keys = bank.len(), "sample bank ready");
    Ok(bank)
}

/// Detection, mixing and output wiring for one session.
pub struct PianoApp {
    audio_port: Option<Box<dyn AudioOutputPort>>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    bank: Arc<SampleBank>,
    detector: KeyDetector,
    screen: Arc<Mutex<ScreenBuffer>>,
    mixer: Mixer,
    reader: Option<MixReader>,
    audio_params: Arc<AudioParams>,
    stream_clock: Arc<StreamClock>,
    audio_stream: Option<Box<dyn AudioStreamHandle>>,
    events: VecDeque<Event>,
    frame: u64,
}

impl PianoApp {
    pub fn new(
        settings: SettingsDto,
        bank: SampleBank,
        audio_port: Option<Box<dyn AudioOutputPort>>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Result<Self, AppError> {
        if bank.layout() != settings.key_layout {
            return Err(AppError::LayoutMismatch {
                bank: bank.layout(),
                settings: settings.key_layout,
            });
        }

        let bank = Arc::new(bank);
        let detector = KeyDetector::new(
            settings.key_layout,
            &settings.geometry,
            DetectorConfig::from(&settings),
        );
        let screen = ScreenBuffer::new(settings.screen_width, settings.screen_height);
        let (writer, reader) = MixBuffer::new(settings.mix_buffer_len, settings.write_lead_samples);
        let mixer = Mixer::new(bank.clone(), writer, settings.note_trigger);
        let audio_params = Arc::new(AudioParams::new(&settings));

        let mut events = VecDeque::new();
        events.push_back(Event::BankReady {
            layout: bank.layout(),
            keys: bank.len(),
        });

        Ok(Self {
            audio_port,
            storage,
            settings,
            bank,
            detector,
            screen: Arc::new(Mutex::new(screen)),
            mixer,
            reader: Some(reader),
            audio_params,
            stream_clock: Arc::new(StreamClock::default()),
            audio_stream: None,
            events,
            frame: 0,
        })
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    pub fn key_states(&self) -> &[KeyState] {
        self.detector.states()
    }

    pub fn screen(&self) -> Arc<Mutex<ScreenBuffer>> {
        self.screen.clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn mix_cursors(&self) -> MixCursors {
        self.mixer.cursors()
    }

    /// Frames the open output stream has rendered, `None` without a stream.
    pub fn stream_sample_time(&self) -> Option<SampleTime> {
        self.audio_stream
            .as_ref()
            .map(|_| self.stream_clock.sample_time())
    }

    /// Hands out the consumer half of the mix buffer for a caller-driven
    /// drain. `None` once it is owned by an audio stream or already taken.
    pub fn take_reader(&mut self) -> Option<MixReader> {
        self.reader.take()
    }

    /// Runs detection over one camera frame and mixes the resulting notes.
    pub fn process_frame(&mut self, frame: &dyn FrameSource) -> &[KeyState] {
        let previous = self.detector.states().to_vec();
        {
            let mut screen = self.screen.lock();
            self.detector.scan(frame, &mut *screen);
        }
        self.frame += 1;

        let states = self.detector.states();
        if states != previous.as_slice() {
            for (key, (before, after)) in previous.iter().zip(states).enumerate() {
                if before != after {
                    debug!(frame = self.frame, key, ?before, ?after, "key transition");
                }
            }
            self.events.push_back(Event::KeyStatesUpdated {
                frame: self.frame,
                states: states.to_vec(),
            });
        }

        for note in self.mixer.mix_frame(states) {
            if note.samples < self.bank.note(note.key).map_or(0, |n| n.len()) {
                warn!(key = note.key, written = note.samples, "note truncated to buffer capacity");
            }
            self.events.push_back(Event::NoteTriggered {
                key: note.key,
                sample_time: note.start,
            });
        }

        self.detector.states()
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::ListAudioOutputs => {
                let devices = self.audio_port()?.list_outputs()?;
                self.events.push_back(Event::AudioOutputsUpdated { devices });
            }
            Command::SelectAudioOutput { device_id, config } => {
                self.open_audio_output(device_id, config)?;
            }
            Command::SetMasterVolume { volume } => {
                self.settings.master_volume = volume;
                self.audio_params.set_master(volume);
                self.emit_settings();
                self.save_settings();
            }
            Command::SetMuted { muted } => {
                self.audio_params.set_muted(muted);
            }
            Command::SetDetection {
                brightness_threshold,
                hysteresis_margin,
                luminance_threshold,
            } => {
                self.settings.brightness_threshold = brightness_threshold;
                self.settings.hysteresis_margin = hysteresis_margin;
                self.settings.luminance_threshold = luminance_threshold;
                self.detector.set_config(DetectorConfig::from(&self.settings));
                self.emit_settings();
                self.save_settings();
            }
            Command::SetNoteTrigger { trigger } => {
                self.settings.note_trigger = trigger;
                self.mixer.set_trigger(trigger);
                self.emit_settings();
                self.save_settings();
            }
            Command::ResetKeys => {
                self.detector.reset();
                self.screen.lock().clear();
                self.events.push_back(Event::KeyStatesUpdated {
                    frame: self.frame,
                    states: self.detector.states().to_vec(),
                });
            }
            Command::ExportDiagnostics { path } => {
                let audio_outputs = match self.audio_port.as_ref() {
                    Some(port) => port.list_outputs()?,
                    None => Vec::new(),
                };
                export_diagnostics(
                    Path::new(&path),
                    &DiagnosticsSnapshot {
                        settings: &self.settings,
                        audio_outputs,
                        frame: self.frame,
                        key_states: self.detector.states(),
                        bright_counts: self.detector.bright_counts(),
                        cursors: self.mixer.cursors(),
                        stream_sample_time: self.stream_sample_time(),
                    },
                )?;
                info!(%path, "diagnostics exported");
            }
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    fn audio_port(&self) -> Result<&dyn AudioOutputPort, AppError> {
        self.audio_port.as_deref().ok_or(AppError::NoAudioPort)
    }

    /// Starts streaming the mix buffer to an output device. Reopening replaces
    /// the buffer, so notes pending in the old stream are dropped.
    pub fn open_audio_output(
        &mut self,
        device_id: Option<DeviceId>,
        config: Option<AudioConfig>,
    ) -> Result<(), AppError> {
        self.audio_port()?;
        if let Some(stream) = self.audio_stream.take() {
            stream.close();
        }

        let config = config.unwrap_or(AudioConfig {
            sample_rate_hz: self.settings.sample_rate_hz,
            channels: 2,
            buffer_size_frames: self.settings.audio_buffer_size_frames,
        });

        let reader = match self.reader.take() {
            Some(reader) => reader,
            None => {
                let (writer, reader) =
                    MixBuffer::new(self.settings.mix_buffer_len, self.settings.write_lead_samples);
                self.mixer.replace_writer(writer);
                reader
            }
        };

        self.stream_clock = Arc::new(StreamClock::default());
        let graph = AudioGraph::new(reader, self.audio_params.clone(), self.stream_clock.clone());
        let stream = self
            .audio_port()?
            .open_output(device_id.as_ref(), config, Box::new(graph))?;
        info!(
            device = ?device_id,
            sample_rate_hz = config.sample_rate_hz,
            "audio output opened"
        );

        self.audio_stream = Some(stream);
        self.settings.audio_device = device_id;
        self.settings.sample_rate_hz = config.sample_rate_hz;
        self.emit_settings();
        self.save_settings();
        Ok(())
    }

    pub fn close_audio_output(&mut self) {
        if let Some(stream) = self.audio_stream.take() {
            stream.close();
            info!("audio output closed");
        }
    }

    fn emit_settings(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            settings: self.settings.clone(),
        });
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                warn!(%err, "failed to save settings");
            }
        }
    }
}
