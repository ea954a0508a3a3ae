//! External generation providers
//!
//! Provider families are selected by configuration. Each family is one
//! adapter implementation, so response-shape differences never leak into the
//! resolver.

pub mod extract;
pub mod image;
pub mod text;

pub use extract::{parse_dish, GeneratedDish};
pub use image::{ImageAdapter, ImageGenerator};
pub use text::{TextAdapter, TextGenerator};
