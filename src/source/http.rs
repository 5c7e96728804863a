//! HTTP client for a BigBlueButton playback server.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::PresentationSource;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::session::Locator;

/// Fetches presentation files over HTTP(S).
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::network("client setup", e))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                url: url.to_string(),
            });
        }
        response
            .error_for_status()
            .map_err(|e| Error::network(url, e))
    }
}

#[async_trait]
impl PresentationSource for HttpSource {
    async fn fetch_document(&self, locator: &Locator, relative: &str) -> Result<String> {
        let url = locator.presentation_url(relative);
        let response = self.get(&url).await?;
        response.text().await.map_err(|e| Error::network(url, e))
    }

    async fn download(
        &self,
        locator: &Locator,
        relative: &str,
        destination: &Path,
    ) -> Result<u64> {
        let url = locator.presentation_url(relative);
        let mut response = self.get(&url).await?;

        let mut file = fs::File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::network(url.as_str(), e))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per accepted connection.
    async fn serve(responses: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/playback/presentation/2.0/playback.html?meetingId=m1")
    }

    #[tokio::test]
    async fn test_fetch_document() {
        let url = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<recording>",
        ])
        .await;
        let locator = Locator::parse(&url).unwrap();
        let source = HttpSource::new(&NetworkConfig::default()).unwrap();

        let body = source.fetch_document(&locator, "metadata.xml").await.unwrap();
        assert_eq!(body, "<recording>");
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let url = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nPNG!!",
        ])
        .await;
        let locator = Locator::parse(&url).unwrap();
        let source = HttpSource::new(&NetworkConfig::default()).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("0.png");

        let written = source.download(&locator, "slide-1.png", &dest).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"PNG!!");
    }

    #[tokio::test]
    async fn test_not_found_is_reported() {
        let url = serve(vec![
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ])
        .await;
        let locator = Locator::parse(&url).unwrap();
        let source = HttpSource::new(&NetworkConfig::default()).unwrap();

        let err = source
            .fetch_document(&locator, "shapes.svg")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/presentation/m1/shapes.svg"));
    }
}
