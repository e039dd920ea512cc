use futures_util::TryStreamExt;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

/// Upper bound for the buffer reserved up front from a response's `Content-Length`.
const MAX_PREALLOC_BYTES: usize = 20_000_000;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Covers errors while streaming the response body
    #[error("Download of {0} failed")]
    DownloadIo(String, #[source] io::Error),
}

/// Builds the client shared by every upstream call. Each request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// Sends `request` and streams the whole body into memory.
///
/// `url` is only used for error reporting.
pub async fn download(request: RequestBuilder, url: &str) -> Result<Vec<u8>, HttpError> {
    let response = request
        .send()
        .await
        .map_err(|e| HttpError::NetworkRequest(url.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            return Err(if let Some(status) = e.status() {
                HttpError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                HttpError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    let capacity = response
        .content_length()
        .map_or(0, |len| usize::try_from(len).unwrap_or(usize::MAX))
        .min(MAX_PREALLOC_BYTES);
    let stream = response.bytes_stream().map_err(io::Error::other);
    let mut reader = StreamReader::new(stream);
    let mut body = Vec::with_capacity(capacity);
    reader
        .read_to_end(&mut body)
        .await
        .map_err(|e| HttpError::DownloadIo(url.to_string(), e))?;
    debug!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}
