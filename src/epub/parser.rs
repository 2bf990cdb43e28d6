//! EPUB parsing utilities (container.xml, OPF)

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// One `<item>` of the OPF manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

/// Parsed OPF package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OpfData {
    pub title: String,
    pub creators: Vec<String>,
    /// Manifest items in document order.
    pub manifest: Vec<ManifestItem>,
    /// Spine `idref`s in reading order.
    pub spine: Vec<String>,
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = std::str::from_utf8(strip_bom(bytes))
        .map_err(|e| Error::InvalidPackage(format!("container.xml is not UTF-8: {e}")))?;

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::InvalidPackage(format!("container.xml: {e}"))),
            _ => {}
        }
    }

    Err(Error::InvalidPackage(
        "no rootfile found in container.xml".to_string(),
    ))
}

/// Parse the OPF package document.
pub fn parse_opf(content: &str) -> Result<OpfData> {
    // Text around entity references arrives in separate events; trimming
    // each one would drop the spaces next to `&amp;`.
    let mut reader = Reader::from_str(content);

    let mut opf = OpfData::default();
    let mut in_metadata = false;
    let mut current: Option<&'static str> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"metadata" => in_metadata = true,
                b"title" if in_metadata => {
                    current = Some("title");
                    text.clear();
                }
                b"creator" if in_metadata => {
                    current = Some("creator");
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"item" => {
                    let id = attribute(&e, b"id").unwrap_or_default();
                    if !id.is_empty() {
                        opf.manifest.push(ManifestItem {
                            id,
                            href: attribute(&e, b"href").unwrap_or_default(),
                            media_type: attribute(&e, b"media-type").unwrap_or_default(),
                        });
                    }
                }
                b"itemref" => {
                    if let Some(idref) = attribute(&e, b"idref") {
                        opf.spine.push(idref);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if current.is_some() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                if local_name(e.name().as_ref()) == b"metadata" {
                    in_metadata = false;
                }
                match current.take() {
                    Some("title") => opf.title = text.trim().to_string(),
                    Some("creator") => opf.creators.push(text.trim().to_string()),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::InvalidPackage(format!("content.opf: {e}"))),
            _ => {}
        }
    }

    Ok(opf)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Strip UTF-8 BOM if present.
fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else {
        entity.strip_prefix('#').and_then(|dec| dec.parse().ok())
    };
    code.and_then(char::from_u32).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_rootfile() {
        let xml = br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;
        assert_eq!(parse_container_xml(xml).unwrap(), "OPS/content.opf");
    }

    #[test]
    fn test_container_without_rootfile() {
        let err = parse_container_xml(b"<container><rootfiles/></container>").unwrap_err();
        assert!(matches!(err, Error::InvalidPackage(_)));
    }

    #[test]
    fn test_parse_opf() {
        let opf = parse_opf(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Tom &amp; Jerry</dc:title>
    <dc:creator>Someone</dc:creator>
  </metadata>
  <manifest>
    <item id="b" href="pages/b.xhtml" media-type="application/xhtml+xml"/>
    <item id="a" href="pages/a.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine><itemref idref="b"/><itemref idref="a"/></spine>
</package>"#,
        )
        .unwrap();

        assert_eq!(opf.title, "Tom & Jerry");
        assert_eq!(opf.creators, ["Someone"]);
        let ids: Vec<_> = opf.manifest.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(opf.manifest[0].href, "pages/b.xhtml");
        assert_eq!(opf.spine, ["b", "a"]);
    }

    #[test]
    fn test_parse_opf_keeps_spaces_around_entities() {
        let opf = parse_opf(
            r#"<package><metadata>
    <dc:title>
      Issue #1 &lt;Special&gt; &#x26; more
    </dc:title>
    <dc:creator>A &amp; B</dc:creator>
    <dc:creator> C &apos;D&apos; </dc:creator>
</metadata></package>"#,
        )
        .unwrap();

        assert_eq!(opf.title, "Issue #1 <Special> & more");
        assert_eq!(opf.creators, ["A & B", "C 'D'"]);
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity("#x41").as_deref(), Some("A"));
        assert_eq!(resolve_entity("#66").as_deref(), Some("B"));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}
