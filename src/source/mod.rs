//! Retrieval of presentation documents and media.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::session::Locator;

pub mod http;

pub use http::HttpSource;

/// Where a recording's files come from.
///
/// `relative` paths are resolved under the meeting's presentation root,
/// e.g. `metadata.xml` or `presentation/<id>/slide-1.png`.
#[async_trait]
pub trait PresentationSource: Send + Sync {
    /// Fetch a text document.
    async fn fetch_document(&self, locator: &Locator, relative: &str) -> Result<String>;

    /// Download a file to `destination`, returning the number of bytes written.
    async fn download(&self, locator: &Locator, relative: &str, destination: &Path)
        -> Result<u64>;
}
