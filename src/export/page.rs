//! Per-page resources: the re-encoded image and the XHTML document showing it.

use std::io;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::model::{Page, PageId};
use crate::util::escape_xml;

/// Title given to every page document.
pub const PAGE_TITLE: &str = "Image Page";

/// Default JPEG quality for re-encoded pages.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Encodes rasters and wraps them in minimal page documents.
#[derive(Debug, Clone, Copy)]
pub struct PageBuilder {
    quality: u8,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set JPEG quality (clamped to 1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn build(&self, id: PageId, raster: &RgbImage) -> io::Result<Page> {
        let image = encode_jpeg(raster, self.quality)?;
        let markup = page_markup(&id);
        Ok(Page { id, image, markup })
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a page at the default quality.
pub fn build_page(id: PageId, raster: &RgbImage) -> io::Result<Page> {
    PageBuilder::new().build(id, raster)
}

fn encode_jpeg(raster: &RgbImage, quality: u8) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(io::Error::other)?;
    Ok(bytes)
}

/// XHTML document with a single block holding the page image.
///
/// The image is referenced relative to the `pages/` directory.
pub fn page_markup(id: &PageId) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title></head>
<body><div><img src="../{src}" alt=""/></div></body>
</html>
"#,
        title = escape_xml(PAGE_TITLE),
        src = escape_xml(&id.image_href()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page_id(name: &str) -> PageId {
        PageId::from_entry_name(name).unwrap()
    }

    #[test]
    fn test_markup_references_sibling_image() {
        let markup = page_markup(&page_id("page1.png"));
        assert!(markup.contains(r#"<img src="../images/page1.jpg" alt=""/>"#));
        assert!(markup.contains("<title>Image Page</title>"));
        assert!(!markup.contains("<link"));
        assert!(!markup.contains("style"));
    }

    #[test]
    fn test_build_encodes_jpeg() {
        let raster = RgbImage::from_pixel(12, 7, Rgb([90, 90, 90]));
        let page = build_page(page_id("p.png"), &raster).unwrap();

        assert_eq!(&page.image[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&page.image).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn test_quality_clamped() {
        let builder = PageBuilder::new().with_quality(0);
        assert_eq!(builder.quality, 1);
        let builder = PageBuilder::new().with_quality(250);
        assert_eq!(builder.quality, 100);
    }
}
