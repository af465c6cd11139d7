//! Fetching raw candidate lists.
//!
//! A source is either an `http(s)://` URL or a local file (`file://` URL or a
//! bare path). A failed fetch is always an error, never an empty body.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;
use url::Url;

use crate::error::SourceError;

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String, SourceError>;
}

pub struct HttpSourceFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpSourceFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    async fn get(&self, location: &str) -> Result<String, SourceError> {
        let http_err = |source: reqwest::Error| SourceError::Http {
            location: location.to_string(),
            source,
        };

        let response = self
            .client
            .get(location)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(http_err)
    }

    async fn read(&self, location: &str, path: PathBuf) -> Result<String, SourceError> {
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                location: location.to_string(),
                source,
            })
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                trace!(location, "fetching over http");
                self.get(location).await
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| SourceError::Io {
                    location: location.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a local path"),
                })?;
                self.read(location, path).await
            }
            // Relative paths and anything that is not a URL are read from disk.
            _ => self.read(location, PathBuf::from(location)).await,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpSourceFetcher {
        HttpSourceFetcher::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn fetches_body_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.1.1.1\n2.2.2.2:8080\n"))
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/list.txt", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "1.1.1.1\n2.2.2.2:8080\n");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let location = format!("{}/gone.txt", server.uri());
        let result = fetcher().fetch(&location).await;
        assert!(
            matches!(&result, Err(SourceError::Status { status: 404, location: l }) if *l == location),
            "unexpected: {result:?}"
        );
    }

    #[tokio::test]
    async fn empty_body_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let body = fetcher().fetch(&server.uri()).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local.txt");
        std::fs::write(&file, "3.3.3.3\n").unwrap();

        let bare = fetcher().fetch(file.to_str().unwrap()).await.unwrap();
        assert_eq!(bare, "3.3.3.3\n");

        let url = Url::from_file_path(&file).unwrap();
        let via_url = fetcher().fetch(url.as_str()).await.unwrap();
        assert_eq!(via_url, "3.3.3.3\n");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = fetcher().fetch("/definitely/not/here/list.txt").await;
        assert!(matches!(result, Err(SourceError::Io { .. })), "unexpected: {result:?}");
    }
}
