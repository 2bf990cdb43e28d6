//! EPUB package assembly.
//!
//! Writes the fixed structural entries, one image and one page document per
//! comic page, and finally the OPF package document listing every page in
//! reading order.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::model::{Page, PageId};
use crate::util::{escape_xml, utc_timestamp};

/// Directory inside the package holding the OPF, images and pages.
pub const PACKAGE_DIR: &str = "OPS";

/// Placeholder metadata; comic archives carry none of their own.
pub const DEFAULT_TITLE: &str = "Converted CBZ";
pub const DEFAULT_AUTHOR: &str = "Your Name";

/// Configuration for EPUB packaging.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6). Level 0 stores
    /// entries uncompressed.
    pub compression_level: Option<u32>,
    /// `dc:title` of the package.
    pub title: String,
    /// `dc:creator` of the package.
    pub author: String,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: None,
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

/// Streaming EPUB writer.
///
/// `mimetype` and `container.xml` are written on construction, pages are
/// appended with [`add_page`](Self::add_page), and [`finish`](Self::finish)
/// writes the OPF. Only one page needs to be in memory at a time.
pub struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    deflated: SimpleFileOptions,
    config: EpubConfig,
    pages: Vec<PageId>,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(writer: W, config: EpubConfig) -> io::Result<Self> {
        let mut zip = ZipWriter::new(writer);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        // Deflate only accepts levels 1-9; level 0 means store.
        let deflated = match config.compression_level.unwrap_or(6).min(9) {
            0 => stored,
            level => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level))),
        };

        // 1. Write mimetype (must be first, uncompressed)
        zip.start_file("mimetype", stored).map_err(io_error)?;
        zip.write_all(b"application/epub+zip")?;

        // 2. Write container.xml
        zip.start_file("META-INF/container.xml", deflated)
            .map_err(io_error)?;
        zip.write_all(CONTAINER_XML)?;

        Ok(Self {
            zip,
            deflated,
            config,
            pages: Vec::new(),
        })
    }

    /// Append a page's image entry followed by its document entry.
    pub fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let image_path = format!("{PACKAGE_DIR}/{}", page.id.image_href());
        self.zip
            .start_file(image_path.as_str(), self.deflated)
            .map_err(io_error)?;
        self.zip.write_all(&page.image)?;

        let page_path = format!("{PACKAGE_DIR}/{}", page.id.page_href());
        self.zip
            .start_file(page_path.as_str(), self.deflated)
            .map_err(io_error)?;
        self.zip.write_all(page.markup.as_bytes())?;

        self.pages.push(page.id.clone());
        Ok(())
    }

    /// Number of pages written so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the OPF and close the archive, returning the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        let opf = generate_opf(&self.config, &self.pages, &utc_timestamp());
        self.zip
            .start_file(format!("{PACKAGE_DIR}/content.opf").as_str(), self.deflated)
            .map_err(io_error)?;
        self.zip.write_all(opf.as_bytes())?;

        self.zip.finish().map_err(io_error)
    }
}

/// Write `pages` as a complete EPUB at `output`.
///
/// A partially written file is left in place on failure.
pub fn assemble(pages: &[Page], output: &Path, config: &EpubConfig) -> Result<()> {
    let write_error = |source| Error::PackageWrite {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(write_error)?;
    let mut writer = PackageWriter::new(BufWriter::new(file), config.clone()).map_err(write_error)?;
    for page in pages {
        writer.add_page(page).map_err(write_error)?;
    }
    writer
        .finish()
        .and_then(|mut inner| inner.flush())
        .map_err(write_error)
}

/// Convert zip error to io error.
fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Generate content.opf: metadata, one manifest item per page, and the spine.
fn generate_opf(config: &EpubConfig, pages: &[PageId], modified: &str) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );

    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(&config.title)
    ));
    opf.push_str(&format!(
        "    <dc:creator>{}</dc:creator>\n",
        escape_xml(&config.author)
    ));
    opf.push_str("    <dc:language>en</dc:language>\n");
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">urn:uuid:{}</dc:identifier>\n",
        uuid::Uuid::new_v4()
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape_xml(modified)
    ));
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    for id in pages {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            escape_xml(id.as_str()),
            escape_xml(&id.page_href())
        ));
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine>\n");
    for id in pages {
        opf.push_str(&format!(
            "    <itemref idref=\"{}\"/>\n",
            escape_xml(id.as_str())
        ));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("</package>\n");
    opf
}
