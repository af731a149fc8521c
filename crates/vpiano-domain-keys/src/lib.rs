pub mod detector;
pub mod geometry;
pub mod luminance;
pub mod screen;
pub mod state;

pub use detector::*;
pub use geometry::*;
pub use luminance::*;
pub use screen::*;
pub use state::*;
