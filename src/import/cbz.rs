//! CBZ archive extraction.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

/// A file written into the scratch directory by [`extract_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Entry name as stored in the archive (e.g. `pages/001.jpg`).
    pub name: String,
    /// Location of the extracted bytes on disk.
    pub path: PathBuf,
}

/// Extract every entry of `source` into `destination`.
///
/// Entries are processed one at a time in archive order; directory entries
/// are recreated, intermediate directories are created as needed, and file
/// bytes are streamed through a buffered writer so no entry is held in
/// memory whole.
///
/// Returns the extracted files (directories excluded) in archive order.
/// That list, not a directory listing, defines the page order downstream.
pub fn extract_archive(source: &Path, destination: &Path) -> Result<Vec<ExtractedEntry>> {
    let file = File::open(source).map_err(|e| Error::archive_read(source, ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::archive_read(source, e))?;

    tracing::debug!(
        source = %source.display(),
        entries = archive.len(),
        "extracting archive"
    );

    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::archive_read(source, e))?;

        let name = entry.name().to_string();
        let relative = entry.enclosed_name().ok_or_else(|| {
            let msg = format!("entry '{name}' escapes the archive root");
            Error::archive_read(
                source,
                ZipError::Io(io::Error::new(io::ErrorKind::InvalidData, msg)),
            )
        })?;
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| Error::filesystem(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
        }

        let out_file = File::create(&out_path).map_err(|e| Error::filesystem(&out_path, e))?;
        let mut writer = BufWriter::new(out_file);
        copy_entry(&mut entry, &mut writer, &out_path, source)?;
        writer.flush().map_err(|e| Error::filesystem(&out_path, e))?;

        tracing::debug!(entry = %name, bytes = entry.size(), "extracted entry");
        extracted.push(ExtractedEntry {
            name,
            path: out_path,
        });
    }

    Ok(extracted)
}

/// Copy one entry, attributing read failures to the archive and write
/// failures to the destination file.
fn copy_entry<R: io::Read, W: Write>(
    entry: &mut R,
    writer: &mut W,
    out_path: &Path,
    source: &Path,
) -> Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let read = match entry.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::archive_read(source, ZipError::Io(e))),
        };
        writer
            .write_all(&buf[..read])
            .map_err(|e| Error::filesystem(out_path, e))?;
    }
}
