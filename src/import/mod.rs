//! Source archive importers.

mod cbz;

pub use cbz::{ExtractedEntry, extract_archive};
