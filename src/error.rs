//! Error types for the download pipeline.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rebuilding a recording.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The playback URL does not have the expected shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value cannot be used for a run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An HTTP request failed or returned an error status.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server has no file at this URL (HTTP 404).
    #[error("not found on server: {url}")]
    NotFound { url: String },

    /// The session metadata document is malformed or incomplete.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The slide manifest is empty, malformed, or missing attributes.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// The working directory for this meeting already exists.
    #[error("working directory already exists: {}", path.display())]
    DirectoryExists { path: PathBuf },

    /// A final output path is already taken.
    #[error("destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to produce its output.
    #[error("tool execution failed: {tool}: {message}")]
    ExternalToolFailure { tool: String, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a network error for the given URL.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// True when the server answered 404 for a request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = Error::DirectoryExists {
            path: PathBuf::from("/tmp/meeting-1"),
        };
        assert_eq!(
            err.to_string(),
            "working directory already exists: /tmp/meeting-1"
        );
    }

    #[test]
    fn test_tool_failed_message() {
        let err = Error::tool_failed("ffmpeg", "exited with status 1");
        assert_eq!(
            err.to_string(),
            "tool execution failed: ffmpeg: exited with status 1"
        );
        assert!(!err.is_not_found());
    }
}
