//! # cbz2epub
//!
//! Repackages comic-book archives (CBZ) as image EPUB packages.
//!
//! ## Pipeline
//!
//! - Extract the archive into a scratch directory, keeping archive order
//! - Decode each page, flatten transparency onto white, and stretch it to
//!   the target size (aspect ratio is not preserved)
//! - Re-encode as JPEG and wrap each image in a one-image XHTML page
//! - Write `mimetype`, `META-INF/container.xml`, the pages, and an OPF
//!   whose spine follows archive order
//!
//! ## Quick Start
//!
//! ```no_run
//! use cbz2epub::convert;
//!
//! let report = convert("comic.cbz", "comic.epub", 800, 1200)?;
//! println!("wrote {} pages to {}", report.page_count(), report.output.display());
//! # Ok::<(), cbz2epub::Error>(())
//! ```
//!
//! ## Page ids
//!
//! Each page is named after its archive entry with the extension removed
//! (`page1.png` becomes `page1`). Entries whose ids collide, such as
//! `cover.jpg` and `cover.png`, are rejected with
//! [`Error::DuplicatePageId`] before any output is written.

pub mod convert;
pub mod epub;
pub mod error;
pub mod export;
pub mod import;
pub mod io;
pub mod model;
pub mod transform;
pub(crate) mod util;

pub use convert::{
    ConversionReport, ConvertConfig, Converter, assign_page_ids, convert, default_output_path,
};
pub use epub::{PackageSummary, inspect_epub};
pub use error::{Error, Result};
pub use export::{EpubConfig, PackageWriter, PageBuilder, assemble, build_page};
pub use import::{ExtractedEntry, extract_archive};
pub use io::{ScratchWorkspace, with_scratch_workspace};
pub use model::{Dimensions, Page, PageId};
pub use transform::{ImageTransformer, ResizeFilter, transform};
