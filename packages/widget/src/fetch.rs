//! Retrieval of widget source bodies.
//!
//! [`HttpFetcher`] issues exactly one cache-bypassing GET per call, with no
//! retry. [`FileFetcher`] reads local files, and [`SourceFetcher`] picks
//! between the two based on the source string.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};

use crate::WidgetError;

/// Retrieves the raw body behind a widget's `src`.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Fetches the body for `src`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError`] if the source is unreachable or answers with
    /// a non-success status.
    async fn fetch(&self, src: &str) -> Result<String, WidgetError>;
}

/// Fetches sources over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn new() -> Result<Self, WidgetError> {
        Self::builder().build()
    }

    /// Returns a builder for customizing the client.
    #[must_use]
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// Wraps an existing client. The caller is responsible for its headers.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self, src: &str) -> Result<String, WidgetError> {
        log::debug!("GET {src}");

        let response = self.client.get(src).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcherBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpFetcherBuilder {
    /// Sets a total request timeout. Without one, only the transport's own
    /// limits apply.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn build(self) -> Result<HttpFetcher, WidgetError> {
        let mut builder = reqwest::Client::builder().default_headers(default_headers());

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(HttpFetcher {
            client: builder.build()?,
        })
    }
}

/// Headers sent with every request: JSON accept plus cache bypass.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Reads sources from the local filesystem.
///
/// Relative paths resolve against `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    /// Creates a fetcher resolving paths against the working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_dir: None }
    }

    /// Resolves relative paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = PathBuf::from(src.strip_prefix("file://").unwrap_or(src));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl PayloadFetcher for FileFetcher {
    async fn fetch(&self, src: &str) -> Result<String, WidgetError> {
        let path = self.resolve(src);
        log::debug!("Reading {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Dispatches `http://` and `https://` sources to HTTP and everything else
/// to the filesystem.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    /// Combines an HTTP and a file fetcher.
    #[must_use]
    pub const fn new(http: HttpFetcher, file: FileFetcher) -> Self {
        Self { http, file }
    }
}

/// Returns `true` if `src` should be fetched over HTTP.
#[must_use]
pub fn is_remote(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl PayloadFetcher for SourceFetcher {
    async fn fetch(&self, src: &str) -> Result<String, WidgetError> {
        if is_remote(src) {
            self.http.fetch(src).await
        } else {
            self.file.fetch(src).await
        }
    }
}
