//! Small helpers shared by the exporters.

use chrono::{DateTime, Utc};

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Current UTC time formatted for `dcterms:modified` (`YYYY-MM-DDThh:mm:ssZ`).
pub fn utc_timestamp() -> String {
    format_utc(Utc::now())
}

fn format_utc(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
