use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, FromSample, Sample, SampleFormat, SampleRate, SizedSample, StreamConfig,
    SupportedStreamConfigRange,
};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info};
use vpiano_ports::audio::{AudioError, AudioOutputPort, AudioRenderCallback, AudioStreamHandle};
use vpiano_ports::types::{AudioConfig, AudioOutputDevice, DeviceId};

/// Output stream fallback size when the host picks its own buffer size.
const DEFAULT_SCRATCH_FRAMES: usize = 8192;

pub struct CpalAudioOutputPort {
    host: cpal::Host,
}

impl CpalAudioOutputPort {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    fn enumerate(host: &cpal::Host) -> Result<Vec<(DeviceId, cpal::Device)>, AudioError> {
        let host_id = format!("{:?}", host.id());
        let devices = host
            .output_devices()
            .map_err(|e| AudioError::Backend(e.to_string()))?;

        Ok(devices
            .enumerate()
            .map(|(index, device)| {
                let name = device_name(&device);
                (DeviceId(format!("cpal:{host_id}:{index}:{name}")), device)
            })
            .collect())
    }

    fn find_device(host: &cpal::Host, id: Option<&DeviceId>) -> Result<cpal::Device, AudioError> {
        match id {
            None => host
                .default_output_device()
                .ok_or_else(|| AudioError::DeviceUnavailable("no default output".to_string())),
            Some(id) => Self::enumerate(host)?
                .into_iter()
                .find(|(candidate, _)| candidate == id)
                .map(|(_, device)| device)
                .ok_or_else(|| AudioError::DeviceNotFound(id.to_string())),
        }
    }
}

impl Default for CpalAudioOutputPort {
    fn default() -> Self {
        Self::new()
    }
}

fn device_name(device: &cpal::Device) -> String {
    device
        .name()
        .unwrap_or_else(|_| "Unknown Output".to_string())
}

pub struct CpalAudioStreamHandle {
    stop_tx: mpsc::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl AudioStreamHandle for CpalAudioStreamHandle {
    fn close(mut self: Box<Self>) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

impl AudioOutputPort for CpalAudioOutputPort {
    fn list_outputs(&self) -> Result<Vec<AudioOutputDevice>, AudioError> {
        let mut results = Vec::new();
        for (id, device) in Self::enumerate(&self.host)? {
            let Ok(default_config) = device.default_output_config() else {
                continue;
            };
            results.push(AudioOutputDevice {
                id,
                name: device_name(&device),
                default_config: AudioConfig {
                    sample_rate_hz: default_config.sample_rate().0,
                    channels: default_config.channels(),
                    buffer_size_frames: None,
                },
            });
        }
        Ok(results)
    }

    /// Builds and runs the stream on a dedicated thread, which owns it until
    /// the handle is closed.
    fn open_output(
        &self,
        device_id: Option<&DeviceId>,
        config: AudioConfig,
        cb: Box<dyn AudioRenderCallback>,
    ) -> Result<Box<dyn AudioStreamHandle>, AudioError> {
        let device_id = device_id.cloned();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join_handle = thread::spawn(move || {
            let stream = match start_stream(device_id.as_ref(), config, cb) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));
            let _ = stop_rx.recv();
            drop(stream);
        });

        ready_rx
            .recv()
            .map_err(|e| AudioError::Backend(e.to_string()))??;

        Ok(Box::new(CpalAudioStreamHandle {
            stop_tx,
            join_handle: Some(join_handle),
        }))
    }
}

fn start_stream(
    device_id: Option<&DeviceId>,
    desired: AudioConfig,
    cb: Box<dyn AudioRenderCallback>,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = CpalAudioOutputPort::find_device(&host, device_id)?;

    let mut supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    let chosen = select_supported_config(&mut supported, desired)?;
    let sample_format = chosen.sample_format();
    let mut config = chosen.config();
    config.buffer_size = match desired.buffer_size_frames {
        Some(frames) => BufferSize::Fixed(frames),
        None => BufferSize::Default,
    };

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, cb),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, cb),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, cb),
        other => {
            return Err(AudioError::UnsupportedConfig(format!(
                "sample format {other:?}"
            )))
        }
    }
    .map_err(|e| AudioError::Backend(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    info!(
        device = %device_name(&device),
        sample_rate_hz = config.sample_rate.0,
        channels = config.channels,
        ?sample_format,
        "cpal stream started"
    );
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut cb: Box<dyn AudioRenderCallback>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let scratch_frames = match config.buffer_size {
        BufferSize::Fixed(frames) => frames as usize,
        BufferSize::Default => DEFAULT_SCRATCH_FRAMES,
    };
    let mut left = vec![0.0f32; scratch_frames];
    let mut right = vec![0.0f32; scratch_frames];
    let mut sample_time = 0u64;

    device.build_output_stream(
        config,
        move |data: &mut [T], _info: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels.max(1);
            if frames > left.len() {
                left.resize(frames, 0.0);
                right.resize(frames, 0.0);
            }
            cb.render(sample_time, &mut left[..frames], &mut right[..frames]);
            write_interleaved(data, channels, &left[..frames], &right[..frames]);
            sample_time = sample_time.saturating_add(frames as u64);
        },
        |err| error!(%err, "cpal stream error"),
        None,
    )
}

fn select_supported_config(
    supported: &mut dyn Iterator<Item = SupportedStreamConfigRange>,
    desired: AudioConfig,
) -> Result<cpal::SupportedStreamConfig, AudioError> {
    let format_rank = |format: SampleFormat| match format {
        SampleFormat::F32 => 3,
        SampleFormat::I16 => 2,
        SampleFormat::U16 => 1,
        _ => 0,
    };

    supported
        .filter(|range| range.channels() == desired.channels)
        .filter(|range| {
            (range.min_sample_rate().0..=range.max_sample_rate().0)
                .contains(&desired.sample_rate_hz)
        })
        .filter(|range| format_rank(range.sample_format()) > 0)
        .max_by_key(|range| format_rank(range.sample_format()))
        .map(|range| range.with_sample_rate(SampleRate(desired.sample_rate_hz)))
        .ok_or_else(|| {
            AudioError::UnsupportedConfig(format!(
                "no {}-channel stream at {} Hz",
                desired.channels, desired.sample_rate_hz
            ))
        })
}

/// Interleaves the stereo pair into `data`. Mono devices get the average;
/// channels past the second are silent.
fn write_interleaved<T>(data: &mut [T], channels: usize, left: &[f32], right: &[f32])
where
    T: Sample + FromSample<f32>,
{
    if channels == 0 {
        return;
    }
    for (frame, chunk) in data.chunks_exact_mut(channels).enumerate() {
        let l = left.get(frame).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
        let r = right.get(frame).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
        if channels == 1 {
            chunk[0] = T::from_sample((l + r) * 0.5);
            continue;
        }
        chunk[0] = T::from_sample(l);
        chunk[1] = T::from_sample(r);
        for slot in &mut chunk[2..] {
            *slot = T::EQUILIBRIUM;
        }
    }
}
