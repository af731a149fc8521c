use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Audio callback: must be realtime-safe.
pub trait AudioRenderCallback: Send + 'static {
    fn render(&mut self, sample_time_start: SampleTime, out_l: &mut [f32], out_r: &mut [f32]);
}

pub trait AudioStreamHandle: Send {
    fn close(self: Box<Self>);
}

pub trait AudioOutputPort: Send + Sync {
    fn list_outputs(&self) -> Result<Vec<AudioOutputDevice>, AudioError>;

    /// `None` selects the host's default output.
    fn open_output(
        &self,
        device_id: Option<&DeviceId>,
        config: AudioConfig,
        cb: Box<dyn AudioRenderCallback>,
    ) -> Result<Box<dyn AudioStreamHandle>, AudioError>;
}

/// Push-style sink with a hardware FIFO per channel.
pub trait AudioFifoPort {
    /// Free slots in the (left, right) FIFOs.
    fn ready(&mut self) -> (usize, usize);

    /// Only valid when both channels reported space.
    fn write(&mut self, left: i16, right: i16) -> Result<(), AudioError>;
}
