//! Recording session: where it lives and the documents that describe it.

pub mod locator;
pub mod manifest;
pub mod metadata;

pub use locator::Locator;
pub use manifest::{parse_manifest, ManifestEntry};
pub use metadata::SessionMetadata;

/// Resolve entity references in raw XML text and trim it.
fn xml_text(raw: &str) -> std::result::Result<String, String> {
    quick_xml::escape::unescape(raw)
        .map(|text| text.trim().to_string())
        .map_err(|e| format!("bad entity reference in '{raw}': {e}"))
}
