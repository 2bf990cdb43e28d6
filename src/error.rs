//! Error types for CBZ to EPUB conversion.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a comic archive.
///
/// Every variant is terminal for the current conversion: the pipeline
/// stops at the first failure and nothing is retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// The source archive could not be opened or is not a valid ZIP stream.
    #[error("cannot read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A scratch or output path could not be created or written.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An archive entry is not a decodable raster image.
    #[error("cannot decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: i64, height: i64 },

    /// Failure while emitting the target archive.
    #[error("cannot write package {}: {source}", .path.display())]
    PackageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two archive entries map to the same page identifier.
    #[error("entries '{first}' and '{second}' both map to page id '{id}'")]
    DuplicatePageId {
        id: String,
        first: String,
        second: String,
    },

    #[error("cannot derive a page id from entry name '{0}'")]
    InvalidPageName(String),

    /// A package read back from disk is missing required structure.
    #[error("invalid EPUB: {0}")]
    InvalidPackage(String),
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive_read(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Error::ArchiveRead {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
