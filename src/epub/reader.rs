use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use super::parser::{OpfData, parse_container_xml, parse_opf};
use crate::error::{Error, Result};

/// Structural summary of an EPUB package.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct PackageSummary {
    /// Content of the `mimetype` entry.
    pub mimetype: String,
    /// Path of the OPF named by `META-INF/container.xml`.
    pub opf_path: String,
    /// Every entry name in archive order.
    pub entries: Vec<String>,
    pub opf: OpfData,
}

impl PackageSummary {
    /// Resolve a manifest href (relative to the OPF) to its archive path.
    pub fn resolve_href(&self, href: &str) -> String {
        match self.opf_path.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{href}"),
            None => href.to_string(),
        }
    }
}

/// Read the structure of the EPUB at `path`.
pub fn inspect_epub<P: AsRef<Path>>(path: P) -> Result<PackageSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::archive_read(path, ZipError::Io(e)))?;
    inspect_epub_from_reader(file).map_err(|e| match e {
        Error::ArchiveRead { source, .. } => Error::archive_read(path, source),
        other => other,
    })
}

/// Read the structure of an EPUB from any seekable reader.
pub fn inspect_epub_from_reader<R: Read + Seek>(reader: R) -> Result<PackageSummary> {
    let mut archive = ZipArchive::new(reader).map_err(|e| Error::archive_read("<reader>", e))?;

    let entries = (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .map(|entry| entry.name().to_string())
                .map_err(|e| Error::archive_read("<reader>", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let mimetype = String::from_utf8_lossy(&read_entry(&mut archive, "mimetype")?).into_owned();
    let opf_path = parse_container_xml(&read_entry(&mut archive, "META-INF/container.xml")?)?;
    let opf_bytes = read_entry(&mut archive, &opf_path)?;
    let opf = parse_opf(&String::from_utf8_lossy(&opf_bytes))?;

    Ok(PackageSummary {
        mimetype,
        opf_path,
        entries,
        opf,
    })
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| Error::InvalidPackage(format!("missing entry '{name}'")))?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| Error::archive_read("<reader>", ZipError::Io(e)))?;
    Ok(data)
}
