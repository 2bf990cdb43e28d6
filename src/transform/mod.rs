//! Image transforms for page conversion.

mod raster;

pub use raster::{FLATTEN_BACKGROUND, ImageTransformer, ResizeFilter, transform};
