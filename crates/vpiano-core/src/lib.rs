pub mod app;
pub mod audio_graph;
pub mod audio_params;
pub mod diagnostics;
pub mod fifo;
pub mod ipc;
pub mod mix_buffer;
pub mod mixer;

pub use app::*;
pub use audio_graph::*;
pub use audio_params::*;
pub use diagnostics::*;
pub use fifo::*;
pub use ipc::*;
pub use mix_buffer::*;
pub use mixer::*;
