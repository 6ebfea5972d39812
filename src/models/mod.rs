pub mod common;
pub mod gallery;
pub mod image;
pub mod text;

pub use common::*;
pub use gallery::*;
pub use image::*;
pub use text::*;
