//! CBZ to EPUB conversion pipeline.
//!
//! Extraction, per-page transformation and packaging run sequentially on the
//! calling thread. Each page is decoded, resampled, encoded and written
//! before the next one is touched.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::export::{EpubConfig, PackageWriter, PageBuilder};
use crate::import::{ExtractedEntry, extract_archive};
use crate::io::with_scratch_workspace;
use crate::model::{Dimensions, PageId};
use crate::transform::{ImageTransformer, ResizeFilter};

/// Settings for a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    /// Size every page is stretched to.
    pub dimensions: Dimensions,
    /// JPEG quality for re-encoded pages (1-100). `None` uses the default.
    pub jpeg_quality: Option<u8>,
    pub filter: ResizeFilter,
    pub epub: EpubConfig,
}

impl ConvertConfig {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.epub.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.epub.author = author.into();
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.epub.compression_level = Some(level);
        self
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ConversionReport {
    pub output: PathBuf,
    /// Page ids in reading order.
    pub pages: Vec<String>,
}

impl ConversionReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Converts comic archives with a fixed configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use cbz2epub::{ConvertConfig, Converter, Dimensions};
///
/// let config = ConvertConfig::new(Dimensions::new(1072, 1448)?).with_quality(90);
/// let report = Converter::new(config).convert(Path::new("comic.cbz"), Path::new("comic.epub"))?;
/// println!("{} pages", report.page_count());
/// # Ok::<(), cbz2epub::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Convert `source` into an EPUB at `destination`.
    ///
    /// The scratch directory is removed on every exit path. If packaging
    /// fails after `destination` was created, the partial file is removed.
    pub fn convert(&self, source: &Path, destination: &Path) -> Result<ConversionReport> {
        if refers_to_same_file(source, destination) {
            return Err(Error::filesystem(
                destination,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination would overwrite the source archive",
                ),
            ));
        }

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            dimensions = %self.config.dimensions,
            "converting archive"
        );

        let pages = with_scratch_workspace(|scratch| {
            let entries = extract_archive(source, scratch)?;
            let ids = assign_page_ids(&entries)?;
            self.write_package(&entries, ids, destination)
        })?;

        tracing::info!(pages = pages.len(), output = %destination.display(), "conversion complete");

        Ok(ConversionReport {
            output: destination.to_path_buf(),
            pages: pages.iter().map(|id| id.to_string()).collect(),
        })
    }

    fn write_package(
        &self,
        entries: &[ExtractedEntry],
        ids: Vec<PageId>,
        destination: &Path,
    ) -> Result<Vec<PageId>> {
        let file = File::create(destination).map_err(|source| Error::PackageWrite {
            path: destination.to_path_buf(),
            source,
        })?;

        let result = self.write_pages(BufWriter::new(file), entries, &ids, destination);
        if result.is_err()
            && let Err(e) = fs::remove_file(destination)
        {
            tracing::warn!(path = %destination.display(), error = %e, "failed to remove partial output");
        }
        result.map(|()| ids)
    }

    fn write_pages<W: Write + io::Seek>(
        &self,
        writer: W,
        entries: &[ExtractedEntry],
        ids: &[PageId],
        destination: &Path,
    ) -> Result<()> {
        let write_error = |source| Error::PackageWrite {
            path: destination.to_path_buf(),
            source,
        };

        let transformer = ImageTransformer::new(self.config.dimensions).with_filter(self.config.filter);
        let mut builder = PageBuilder::new();
        if let Some(quality) = self.config.jpeg_quality {
            builder = builder.with_quality(quality);
        }

        let mut package = PackageWriter::new(writer, self.config.epub.clone()).map_err(write_error)?;
        for (entry, id) in entries.iter().zip(ids) {
            let raster = transformer.transform(&entry.path)?;
            let page = builder.build(id.clone(), &raster).map_err(write_error)?;
            package.add_page(&page).map_err(write_error)?;
            tracing::debug!(
                entry = %entry.name,
                page = %id,
                written = package.page_count(),
                total = ids.len(),
                "wrote page"
            );
        }

        package
            .finish()
            .and_then(|mut inner| inner.flush())
            .map_err(write_error)
    }
}

/// Whether `destination` names the same file as `source`, after resolving
/// `..` components and symlinks.
///
/// The destination may not exist yet, so its parent directory is resolved
/// and the file name re-joined.
fn refers_to_same_file(source: &Path, destination: &Path) -> bool {
    if source == destination {
        return true;
    }
    let Ok(source) = fs::canonicalize(source) else {
        return false;
    };
    if let Ok(existing) = fs::canonicalize(destination) {
        return existing == source;
    }

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), destination.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name) == source,
        _ => false,
    }
}

/// Derive page ids for `entries`, rejecting any two that collide.
///
/// Runs before the output file is created, so a collision leaves nothing
/// behind.
pub fn assign_page_ids(entries: &[ExtractedEntry]) -> Result<Vec<PageId>> {
    let mut seen: HashMap<PageId, &str> = HashMap::with_capacity(entries.len());
    let mut ids = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = PageId::from_entry_name(&entry.name)?;
        if let Some(first) = seen.insert(id.clone(), &entry.name) {
            return Err(Error::DuplicatePageId {
                id: id.to_string(),
                first: first.to_string(),
                second: entry.name.clone(),
            });
        }
        ids.push(id);
    }

    Ok(ids)
}

/// Convert `source` into an EPUB at `destination` with every page stretched
/// to `width x height`.
///
/// Dimensions are validated before any file is read or written.
pub fn convert<S, D>(source: S, destination: D, width: i64, height: i64) -> Result<ConversionReport>
where
    S: AsRef<Path>,
    D: AsRef<Path>,
{
    let dimensions = Dimensions::new(width, height)?;
    Converter::new(ConvertConfig::new(dimensions)).convert(source.as_ref(), destination.as_ref())
}

/// The source path with its extension replaced by `epub`.
pub fn default_output_path<P: AsRef<Path>>(source: P) -> PathBuf {
    source.as_ref().with_extension("epub")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ExtractedEntry {
        ExtractedEntry {
            name: name.to_string(),
            path: PathBuf::from("/unused").join(name),
        }
    }

    #[test]
    fn test_assign_ids_in_order() {
        let ids = assign_page_ids(&[entry("b.png"), entry("a.jpg")]).unwrap();
        let ids: Vec<_> = ids.iter().map(PageId::as_str).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_assign_ids_rejects_collision() {
        let err = assign_page_ids(&[entry("cover.jpg"), entry("x.png"), entry("cover.png")])
            .unwrap_err();
        match err {
            Error::DuplicatePageId { id, first, second } => {
                assert_eq!(id, "cover");
                assert_eq!(first, "cover.jpg");
                assert_eq!(second, "cover.png");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("/books/comic.cbz"),
            PathBuf::from("/books/comic.epub")
        );
        assert_eq!(default_output_path("comic"), PathBuf::from("comic.epub"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::new(Dimensions::new(10, 20).unwrap())
            .with_quality(70)
            .with_title("T")
            .with_author("A")
            .with_compression_level(9)
            .with_filter(ResizeFilter::Nearest);
        assert_eq!(config.dimensions.height(), 20);
        assert_eq!(config.jpeg_quality, Some(70));
        assert_eq!(config.epub.title, "T");
        assert_eq!(config.epub.author, "A");
        assert_eq!(config.epub.compression_level, Some(9));
        assert_eq!(config.filter, ResizeFilter::Nearest);
    }

    #[test]
    fn test_same_file_through_aliases() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("comic.cbz");
        fs::write(&source, b"PK").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        assert!(refers_to_same_file(&source, &source));
        assert!(refers_to_same_file(&source, &tmp.path().join("sub/../comic.cbz")));
        assert!(refers_to_same_file(&source, &tmp.path().join("./comic.cbz")));
        assert!(!refers_to_same_file(&source, &tmp.path().join("comic.epub")));
        assert!(!refers_to_same_file(&source, &tmp.path().join("sub/comic.cbz")));
        assert!(!refers_to_same_file(&source, &tmp.path().join("missing/comic.cbz")));
    }

    #[test]
    fn test_invalid_dimensions_checked_first() {
        let err = convert("/does/not/exist.cbz", "/does/not/exist.epub", 0, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }
}
