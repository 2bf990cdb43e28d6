//! Page image resampling.
//!
//! Pages are decoded, flattened to opaque RGB, and stretched to fill the
//! exact target box. Aspect ratio is intentionally not preserved: a
//! 1000x1500 scan asked to fit 800x800 comes out squashed, not letterboxed.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::model::Dimensions;

/// Background used when flattening transparent pixels.
///
/// JPEG has no alpha channel, so transparency is composited onto opaque
/// white, the colour of a blank printed page.
pub const FLATTEN_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Resampling filter used when stretching pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Decodes page images and resamples them to a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct ImageTransformer {
    dimensions: Dimensions,
    filter: ResizeFilter,
}

impl ImageTransformer {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            filter: ResizeFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Decode the image at `path` and produce a `width x height` RGB raster.
    ///
    /// The format is sniffed from the file contents, so extensions do not
    /// need to match.
    pub fn transform(&self, path: &Path) -> Result<RgbImage> {
        let decoded = decode(path)?;
        Ok(self.resample(&decoded))
    }

    /// Flatten and stretch an already decoded image.
    pub fn resample(&self, image: &DynamicImage) -> RgbImage {
        let flat = flatten(image);
        imageops::resize(
            &flat,
            self.dimensions.width(),
            self.dimensions.height(),
            self.filter.into(),
        )
    }
}

/// Decode `path` and stretch it to exactly `width x height` pixels.
///
/// Fails with [`Error::InvalidDimensions`] before touching the file when
/// either side is zero.
pub fn transform(path: &Path, width: u32, height: u32) -> Result<RgbImage> {
    let dimensions = Dimensions::new(i64::from(width), i64::from(height))?;
    ImageTransformer::new(dimensions).transform(path)
}

fn decode(path: &Path) -> Result<DynamicImage> {
    let file = File::open(path).map_err(|e| Error::filesystem(path, e))?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| Error::filesystem(path, e))?;
    reader.decode().map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert to 24-bit RGB, compositing any alpha onto [`FLATTEN_BACKGROUND`].
fn flatten(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([
            blend(r, FLATTEN_BACKGROUND[0], a),
            blend(g, FLATTEN_BACKGROUND[1], a),
            blend(b, FLATTEN_BACKGROUND[2], a),
        ])
    })
}

fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8
}
