//! Reading EPUB packages back for inspection.

mod parser;
mod reader;

pub use parser::{ManifestItem, OpfData, parse_container_xml, parse_opf};
pub use reader::{PackageSummary, inspect_epub, inspect_epub_from_reader};
