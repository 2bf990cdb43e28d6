use std::fmt;

use crate::error::{Error, Result};

/// Identifier of a single page within the package.
///
/// Derived from the base name of the source entry with its extension
/// stripped. The same value is the manifest item id and the stem of both
/// generated files (`images/<id>.jpg` and `pages/<id>.xhtml`), so it is
/// restricted to characters that are safe in an XML name and a ZIP path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(String);

impl PageId {
    /// Derive an id from an archive entry name such as `chapter1/page01.png`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_`. A stem that does not
    /// start with a letter or underscore gets a `p` prefix (`001` -> `p001`).
    pub fn from_entry_name(name: &str) -> Result<Self> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = strip_extension(base);
        if stem.is_empty() {
            return Err(Error::InvalidPageName(name.to_string()));
        }

        let mut id: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if !id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            id.insert(0, 'p');
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the re-encoded image, relative to the package root directory.
    pub fn image_href(&self) -> String {
        format!("images/{}.jpg", self.0)
    }

    /// Path of the wrapping XHTML document, relative to the package root directory.
    pub fn page_href(&self) -> String {
        format!("pages/{}.xhtml", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Drop a trailing `.ext`; names ending in a bare dot are kept whole.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// A fully built page: the encoded image plus the document that shows it.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    /// JPEG bytes.
    pub image: Vec<u8>,
    /// XHTML document embedding the image.
    pub markup: String,
}
