use crate::cli::ScreenArgs;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use vpiano_core::{build_bank, drain_to_fifo, AppError, Command, Event, PianoApp};
use vpiano_domain_synth::SampleBank;
use vpiano_infra_audio_cpal::CpalAudioOutputPort;
use vpiano_infra_fft_rustfft::RustFftPort;
use vpiano_infra_frames_image::{save_screen, ImageDirFrameSource};
use vpiano_infra_samples_wav::{write_waveform, WavFifoSink, WavSampleSource};
use vpiano_infra_storage_fs::FsStorage;
use vpiano_ports::audio::{AudioError, AudioOutputPort};
use vpiano_ports::fft::FftError;
use vpiano_ports::frame::{FrameError, FramePort};
use vpiano_ports::samples::SampleError;
use vpiano_ports::storage::{SettingsDto, StorageError};
use vpiano_ports::types::{Color, DeviceId, Grid};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("fft error: {0}")]
    Fft(#[from] FftError),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("sample error: {0}")]
    Sample(#[from] SampleError),
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no sample directory: pass --samples or set samples_dir in settings")]
    NoSamplesDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn load_bank(settings: &SettingsDto) -> Result<SampleBank, CliError> {
    let dir = settings.samples_dir.as_deref().ok_or(CliError::NoSamplesDir)?;
    let source = WavSampleSource::new(dir, settings.sample_rate_hz);
    let fft = RustFftPort::new(settings.window_size)?;
    Ok(build_bank(settings, &source, &fft)?)
}

/// Samples still to play after the last frame: the longest note plus the
/// writer's lead.
fn tail_samples(app: &PianoApp) -> usize {
    let bank = app.bank();
    let longest = (0..bank.len())
        .filter_map(|key| bank.note(key))
        .map(|note| note.len())
        .max()
        .unwrap_or(0);
    longest + app.settings().write_lead_samples
}

struct Snapshots<'a> {
    args: &'a ScreenArgs,
}

impl Snapshots<'_> {
    fn prepare(&self) -> Result<(), CliError> {
        if let Some(dir) = &self.args.screen_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn due(&self, frame: u64) -> Option<PathBuf> {
        let dir = self.args.screen_dir.as_ref()?;
        if frame % self.args.screen_every.max(1) != 0 {
            return None;
        }
        Some(dir.join(format!("screen_{frame:06}.png")))
    }

    fn save(path: &Path, pixels: &Grid<Color>) {
        if let Err(err) = save_screen(path, pixels) {
            warn!(%err, path = %path.display(), "screen snapshot failed");
        }
    }

    fn maybe_save(&self, app: &PianoApp) {
        if let Some(path) = self.due(app.frame_count()) {
            Self::save(&path, app.screen().lock().pixels());
        }
    }

    /// Copies the display out when a snapshot is due. Neither the app nor the
    /// screen stays locked while the PNG is encoded.
    fn capture(&self, app: &Mutex<PianoApp>) -> Option<(PathBuf, Grid<Color>)> {
        let (path, screen) = {
            let app = app.lock();
            (self.due(app.frame_count())?, app.screen())
        };
        let pixels = screen.lock().pixels().clone();
        Some((path, pixels))
    }
}

fn log_events(events: Vec<Event>) {
    for event in events {
        match event {
            Event::NoteTriggered { key, sample_time } => debug!(key, sample_time, "note"),
            Event::BankReady { layout, keys } => info!(?layout, keys, "bank ready"),
            Event::AudioOutputsUpdated { devices } => {
                for device in devices {
                    info!(id = %device.id, name = %device.name, "output device");
                }
            }
            Event::KeyStatesUpdated { .. } | Event::SettingsUpdated { .. } => {}
        }
    }
}

pub fn list_devices() -> Result<(), CliError> {
    for device in CpalAudioOutputPort::new().list_outputs()? {
        println!(
            "{}\t{}\t{} Hz, {} ch",
            device.id,
            device.name,
            device.default_config.sample_rate_hz,
            device.default_config.channels
        );
    }
    Ok(())
}

/// Live mode: a producer thread scans frames at the frame rate while the
/// audio device drains the mix buffer.
pub fn play(
    settings: SettingsDto,
    storage: FsStorage,
    frames_dir: &Path,
    device: Option<String>,
    screen: &ScreenArgs,
    diagnostics: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut frames = ImageDirFrameSource::open(frames_dir)?;
    let bank = load_bank(&settings)?;
    let frame_delay = Duration::from_millis(settings.frame_delay_ms);
    let sample_rate = settings.sample_rate_hz;

    let mut app = PianoApp::new(
        settings,
        bank,
        Some(Box::new(CpalAudioOutputPort::new())),
        Some(Box::new(storage)),
    )?;
    app.handle_command(Command::SelectAudioOutput {
        device_id: device.map(DeviceId),
        config: None,
    })?;
    let tail = tail_samples(&app);

    let snapshots = Snapshots { args: screen };
    snapshots.prepare()?;

    let app = Arc::new(Mutex::new(app));
    let producer_app = app.clone();
    let producer = thread::spawn(move || -> Result<u64, FrameError> {
        let mut count = 0;
        while let Some(frame) = frames.next_frame()? {
            producer_app.lock().process_frame(&frame);
            count += 1;
            thread::sleep(frame_delay);
        }
        Ok(count)
    });

    while !producer.is_finished() {
        if let Some((path, pixels)) = snapshots.capture(&app) {
            Snapshots::save(&path, &pixels);
        }
        log_events(app.lock().drain_events());
        thread::sleep(frame_delay);
    }
    let count = producer
        .join()
        .map_err(|_| FrameError::Io("frame producer panicked".to_string()))??;
    info!(frames = count, "frame sequence finished");

    thread::sleep(Duration::from_secs_f64(tail as f64 / sample_rate.max(1) as f64));

    let mut app = app.lock();
    log_events(app.drain_events());
    if let Some(dir) = diagnostics {
        app.handle_command(Command::ExportDiagnostics {
            path: dir.to_string_lossy().into_owned(),
        })?;
    }
    app.close_audio_output();
    Ok(())
}

/// Offline mode: the mix buffer is drained into a WAV file through the FIFO
/// interface, one frame's worth of samples per frame.
pub fn render(
    settings: SettingsDto,
    frames_dir: &Path,
    output: &Path,
    screen: &ScreenArgs,
) -> Result<(), CliError> {
    let mut frames = ImageDirFrameSource::open(frames_dir)?;
    let bank = load_bank(&settings)?;
    let per_frame = settings.samples_per_frame();
    let mut sink = WavFifoSink::create(output, settings.sample_rate_hz)?;

    let mut app = PianoApp::new(settings, bank, None, None)?;
    let Some(mut reader) = app.take_reader() else {
        return Err(AudioError::DeviceUnavailable("mix buffer reader in use".to_string()).into());
    };

    let snapshots = Snapshots { args: screen };
    snapshots.prepare()?;

    while let Some(frame) = frames.next_frame()? {
        app.process_frame(&frame);
        snapshots.maybe_save(&app);
        log_events(app.drain_events());
        drain_to_fifo(&mut reader, &mut sink, per_frame)?;
    }

    let tail = tail_samples(&app);
    let mut remaining = tail;
    while remaining > 0 {
        let moved = drain_to_fifo(&mut reader, &mut sink, remaining)?;
        if moved == 0 {
            break;
        }
        remaining -= moved;
    }

    let written = sink.finalize()?;
    info!(
        frames = app.frame_count(),
        samples = written,
        path = %output.display(),
        "render finished"
    );
    Ok(())
}

pub fn export_bank(settings: &SettingsDto, output: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(output)?;
    let bank = load_bank(settings)?;
    for key in 0..bank.len() {
        if let Some(note) = bank.note(key) {
            write_waveform(
                &output.join(format!("key_{key:02}.wav")),
                note,
                settings.sample_rate_hz,
            )?;
        }
    }
    info!(keys = bank.len(), dir = %output.display(), "bank exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpiano_ports::types::{KeyLayout, Waveform};

    fn shared_app() -> Mutex<PianoApp> {
        let settings = SettingsDto {
            key_layout: KeyLayout::Reduced61,
            ..SettingsDto::default()
        };
        let notes = (0..61).map(|_| Waveform::new(vec![1; 4])).collect();
        let bank = SampleBank::from_notes(KeyLayout::Reduced61, notes).unwrap();
        Mutex::new(PianoApp::new(settings, bank, None, None).unwrap())
    }

    #[test]
    fn snapshot_is_encoded_without_holding_locks() {
        let dir = std::env::temp_dir().join(format!("vpiano-snap-{}", std::process::id()));
        let args = ScreenArgs {
            screen_dir: Some(dir.clone()),
            screen_every: 1,
        };
        let snapshots = Snapshots { args: &args };
        snapshots.prepare().unwrap();
        let app = shared_app();

        let (path, pixels) = snapshots.capture(&app).unwrap();
        {
            let guard = app.try_lock().expect("app lock released before encoding");
            assert!(guard.screen().try_lock().is_some());
        }
        Snapshots::save(&path, &pixels);
        assert!(path.ends_with("screen_000000.png"));
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn snapshots_follow_the_frame_interval() {
        let args = ScreenArgs {
            screen_dir: Some(PathBuf::from("shots")),
            screen_every: 30,
        };
        let snapshots = Snapshots { args: &args };
        assert_eq!(snapshots.due(60), Some(PathBuf::from("shots/screen_000060.png")));
        assert_eq!(snapshots.due(61), None);

        let off = ScreenArgs {
            screen_dir: None,
            screen_every: 1,
        };
        assert_eq!(Snapshots { args: &off }.due(0), None);
    }
}
