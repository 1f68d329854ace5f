//! Request handlers.

pub mod catalog;
pub mod health;
pub mod image;
pub mod prompt;
pub mod video;
pub mod voice;

pub use catalog::*;
pub use health::*;
pub use image::*;
pub use prompt::*;
pub use video::*;
pub use voice::*;
