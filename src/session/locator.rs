//! Playback URL parsing.

use crate::error::{Error, Result};

const PLAYBACK_MARKER: &str = "/playback/";
const MEETING_ID_MARKER: &str = "?meetingId=";

/// Where a recording lives: the server base URL and the meeting identifier.
///
/// Parsed from a playback link such as
/// `https://HOST/playback/presentation/2.0/playback.html?meetingId=MEETING_ID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    base_url: String,
    meeting_id: String,
}

impl Locator {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        let (base_url, _) = raw.split_once(PLAYBACK_MARKER).ok_or_else(|| {
            Error::InvalidInput(format!("'{raw}' does not contain '{PLAYBACK_MARKER}'"))
        })?;
        let (_, query) = raw.split_once(MEETING_ID_MARKER).ok_or_else(|| {
            Error::InvalidInput(format!("'{raw}' does not contain '{MEETING_ID_MARKER}'"))
        })?;

        // Drop any further query parameters or fragment.
        let meeting_id = query
            .split(['&', '#'])
            .next()
            .unwrap_or_default()
            .trim();

        if base_url.is_empty() {
            return Err(Error::InvalidInput(format!("'{raw}' has no host")));
        }
        if meeting_id.is_empty() {
            return Err(Error::InvalidInput(format!("'{raw}' has an empty meeting id")));
        }
        if meeting_id.contains(['/', '\\']) || meeting_id == "." || meeting_id == ".." {
            return Err(Error::InvalidInput(format!(
                "meeting id '{meeting_id}' is not a valid directory name"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            meeting_id: meeting_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    /// URL of a file under this meeting's presentation root.
    pub fn presentation_url(&self, relative: &str) -> String {
        format!(
            "{}/presentation/{}/{}",
            self.base_url,
            self.meeting_id,
            relative.trim_start_matches('/')
        )
    }
}
