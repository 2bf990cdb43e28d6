//! Export of converted pages into an EPUB package.
//!
//! - [`PageBuilder`] turns a resampled raster into a [`Page`](crate::model::Page)
//!   (JPEG bytes plus a wrapping XHTML document)
//! - [`PackageWriter`] streams pages into a ZIP container and writes the OPF
//!   package document once every page is in

mod epub;
mod page;

pub use epub::{
    DEFAULT_AUTHOR, DEFAULT_TITLE, EpubConfig, PACKAGE_DIR, PackageWriter, assemble,
};
pub use page::{DEFAULT_JPEG_QUALITY, PAGE_TITLE, PageBuilder, build_page, page_markup};
