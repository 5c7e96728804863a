//! Parser for the slide manifest (`shapes.svg`).
//!
//! Each slide is an `<image>` child of the root with fractional `in`/`out`
//! timestamps and an `xlink:href` pointing at the slide picture. Annotation
//! groups and other children are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::xml_text;
use crate::error::{Error, Result};

const SLIDE_ELEMENT: &[u8] = b"image";

/// A slide as it appears in the manifest, before rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    /// Seconds into the recording when the slide appears.
    pub time_in: f64,
    /// Seconds into the recording when the slide is replaced.
    pub time_out: f64,
    /// Image path relative to the presentation root.
    pub href: String,
}

/// Parse the manifest's slide entries in document order.
///
/// An empty result is not an error here; the timing correction rejects it.
pub fn parse_manifest(xml: &str) -> Result<Vec<ManifestEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut entries = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 1 {
                    collect_slide(e, &mut entries)?;
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 1 {
                    collect_slide(e, &mut entries)?;
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::InvalidManifest(format!("malformed XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    debug!("Manifest lists {} slides", entries.len());
    Ok(entries)
}

fn collect_slide(e: &BytesStart<'_>, entries: &mut Vec<ManifestEntry>) -> Result<()> {
    let index = entries.len();
    if e.local_name().as_ref() != SLIDE_ELEMENT {
        debug!(
            "Skipping manifest element <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        );
        return Ok(());
    }

    let mut time_in = None;
    let mut time_out = None;
    let mut href = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            Error::InvalidManifest(format!("slide {index} has a malformed attribute: {err}"))
        })?;
        let value = xml_text(&String::from_utf8_lossy(&attr.value)).map_err(|msg| {
            Error::InvalidManifest(format!("slide {index}: {msg}"))
        })?;
        match attr.key.as_ref() {
            b"in" => time_in = Some(parse_timestamp(&value, index, "in")?),
            b"out" => time_out = Some(parse_timestamp(&value, index, "out")?),
            // xlink:href, whatever prefix the document binds it to
            _ if attr.key.local_name().as_ref() == b"href" => href = Some(value),
            _ => {}
        }
    }

    entries.push(ManifestEntry {
        time_in: time_in.ok_or_else(|| missing(index, "in"))?,
        time_out: time_out.ok_or_else(|| missing(index, "out"))?,
        href: href.ok_or_else(|| missing(index, "xlink:href"))?,
    });
    Ok(())
}

fn parse_timestamp(value: &str, index: usize, name: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        Error::InvalidManifest(format!(
            "slide {index} has a non-numeric '{name}' attribute: '{value}'"
        ))
    })
}

fn missing(index: usize, name: &str) -> Error {
    Error::InvalidManifest(format!("slide {index} is missing the '{name}' attribute"))
}
