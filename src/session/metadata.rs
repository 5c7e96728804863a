//! Parser for a recording's `metadata.xml`.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::xml_text;
use crate::error::{Error, Result};

/// Fields of the session metadata the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    /// Playback duration in milliseconds.
    pub duration_ms: u64,
    /// Meeting name, safe to use as a file name.
    pub display_name: String,
}

impl SessionMetadata {
    /// Parse `metadata.xml`. `meeting_id` names the output when the
    /// document carries no usable meeting name.
    pub fn parse(xml: &str, meeting_id: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut duration: Option<String> = None;
        let mut meeting_name: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    text.clear();
                }
                Ok(Event::Text(ref t)) => text.push_str(&String::from_utf8_lossy(t)),
                Ok(Event::CData(ref c)) => {
                    let raw = String::from_utf8_lossy(c);
                    text.push_str(&quick_xml::escape::escape(&*raw));
                }
                Ok(Event::GeneralRef(ref r)) => {
                    text.push('&');
                    text.push_str(&String::from_utf8_lossy(r));
                    text.push(';');
                }
                Ok(Event::End(_)) => {
                    // Paths are relative to the document root.
                    let relative: Vec<&str> = path.iter().skip(1).map(String::as_str).collect();
                    match relative.as_slice() {
                        ["playback", "duration"] => {
                            duration = Some(xml_text(&text).map_err(Error::InvalidMetadata)?)
                        }
                        ["meta", "meetingName"] => {
                            meeting_name = Some(xml_text(&text).map_err(Error::InvalidMetadata)?)
                        }
                        _ => {}
                    }
                    path.pop();
                    text.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::InvalidMetadata(format!("malformed XML: {e}")));
                }
                _ => {}
            }
            buf.clear();
        }

        let duration = duration
            .ok_or_else(|| Error::InvalidMetadata("missing playback/duration".to_string()))?;
        let duration_ms = duration.trim().parse::<u64>().map_err(|_| {
            Error::InvalidMetadata(format!("playback duration '{}' is not an integer", duration.trim()))
        })?;

        let display_name = match meeting_name.as_deref().map(display_name) {
            Some(name) if !name.is_empty() => name,
            _ => {
                warn!("Recording has no meeting name, using meeting id {meeting_id}");
                meeting_id.to_string()
            }
        };

        Ok(Self {
            duration_ms,
            display_name,
        })
    }

    /// Duration in minutes, for display.
    pub fn duration_minutes(&self) -> f64 {
        self.duration_ms as f64 / 60_000.0
    }
}

/// Collapse whitespace runs into `_` and strip path separators.
pub fn display_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_")
}
