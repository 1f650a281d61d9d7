//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of a page load:
//! - Building the HTTP client from configuration
//! - GET requests for the root document
//! - Streaming resource bodies straight to disk
//! - Error classification

use crate::config::HttpConfig;
use crate::{FetchError, LoadError};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed transparently up to `max_redirects` hops.
///
/// # Example
///
/// ```no_run
/// use page_mirror::config::HttpConfig;
/// use page_mirror::loader::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A fetched document, body bytes exactly as served
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: Vec<u8>,

    /// The Content-Type header, if the server sent a readable one
    pub content_type: Option<String>,
}

/// Fetches a page without decoding its body
///
/// Any non-2xx status or transport error is a `FetchError`.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = send(client, url).await?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        body: body.to_vec(),
        content_type,
    })
}

/// Downloads `url` into the file at `path`, returning the number of bytes written
///
/// The body is written chunk by chunk as it arrives. A failure after the file
/// was created leaves the partial file in place.
pub async fn download_to(client: &Client, url: &Url, path: &Path) -> Result<u64, LoadError> {
    let response = send(client, url).await?;

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| LoadError::filesystem(path, e))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| classify_error(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| LoadError::filesystem(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| LoadError::filesystem(path, e))?;

    tracing::debug!("Wrote {} bytes from {} to {}", written, url, path.display());

    Ok(written)
}

/// Sends a GET request and rejects non-success statuses
async fn send(client: &Client, url: &Url) -> Result<Response, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Maps a transport error to a `FetchError`, keeping the original cause
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
