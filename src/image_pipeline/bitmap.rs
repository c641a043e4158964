//! Bitmap module
//!
//! Output raster type and the packed-buffer converter that produces it.

mod converter;
pub mod types;

pub use converter::convert_to_image;
pub(crate) use converter::convert_samples;
pub use types::Bitmap;
