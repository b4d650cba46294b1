//! HTTP byte fetching with size limits
//!
//! Shared by the hosted-image probe and the rasterizer's remote loads.

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::utils::SESSION_COOKIE_NAME;

/// Body and content type of a fetched resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for authenticated backend calls: session cookie attached when configured
pub fn build_session_client(config: &ExtractorConfig) -> Result<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(token) = config.session_token() {
        let cookie = format!("{SESSION_COOKIE_NAME}={token}");
        let value = reqwest::header::HeaderValue::from_str(&cookie)
            .context("Session token contains characters not allowed in a header")?;
        headers.insert(reqwest::header::COOKIE, value);
    }

    Client::builder()
        .user_agent(config.user_agent())
        .default_headers(headers)
        .build()
        .context("Failed to build session HTTP client")
}

/// Client for anonymous loads: no cookies, no auth headers
pub fn build_anonymous_client(config: &ExtractorConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent())
        .build()
        .context("Failed to build anonymous HTTP client")
}

/// GET a URL and buffer its body, enforcing `max_size`
///
/// Non-success statuses are errors. The size limit is checked against
/// `Content-Length` first and again while streaming.
pub async fn fetch_bytes(
    client: &Client,
    url: &str,
    extra_headers: &HashMap<String, String>,
    timeout: Duration,
    max_size: usize,
) -> Result<FetchedResource> {
    let mut request = client
        .get(url)
        .timeout(timeout)
        .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8");
    for (name, value) in extra_headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request.send().await.context("Failed to download image")?;

    // Check status
    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Image download failed with status: {}",
            response.status()
        ));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Get expected size and enforce limit BEFORE downloading
    let expected_size = response.content_length().unwrap_or(0);
    if expected_size > max_size as u64 {
        return Err(anyhow::anyhow!(
            "Image too large: {expected_size} bytes exceeds limit of {max_size} bytes"
        ));
    }

    let mut buffer = if expected_size > 0 {
        Vec::with_capacity(expected_size as usize)
    } else {
        Vec::new()
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.context("Failed to read image chunk")?;

        // Check BEFORE accumulating
        let new_total = buffer.len() + chunk.len();
        if new_total > max_size {
            return Err(anyhow::anyhow!(
                "Image download exceeded size limit during download: {new_total} bytes (max: {max_size})"
            ));
        }

        buffer.extend_from_slice(&chunk);
    }

    Ok(FetchedResource {
        content_type,
        bytes: buffer,
    })
}
