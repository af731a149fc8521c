pub mod anchors;
pub mod bank;
pub mod error;
pub mod ops;
pub mod vocoder;

pub use anchors::*;
pub use bank::*;
pub use error::*;
pub use ops::*;
pub use vocoder::*;
