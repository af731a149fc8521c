pub mod audio;
pub mod fft;
pub mod frame;
pub mod samples;
pub mod storage;
pub mod types;

pub use audio::*;
pub use fft::*;
pub use frame::*;
pub use samples::*;
pub use storage::*;
pub use types::*;
