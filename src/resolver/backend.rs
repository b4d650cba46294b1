//! Notion backend calls for hosted images
//!
//! The displayed `<img src>` is often a proxied or cross-origin URL that cannot
//! be downloaded by reference, so a fresh signed URI is minted per request.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::page_context::SpecialIds;
use crate::utils::{DOWNLOAD_SOURCE_META_NAME, IMAGE_PROXY_PATH};

#[derive(Debug, Serialize)]
struct DownloadMeta<'a> {
    name: &'a str,
}

/// Body of `getBlockFileDownloadUrl`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockFileDownloadRequest<'a> {
    block_id: &'a str,
    meta: DownloadMeta<'a>,
    page_block_id: &'a str,
}

/// Signed download descriptor returned by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFileDescriptor {
    pub url: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Client for the signed-download descriptor endpoint
#[derive(Debug, Clone)]
pub struct BlockFileClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl BlockFileClient {
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Request a signed descriptor for `block_id` on page `page_block_id`
    ///
    /// `auth_headers` may be empty (degraded mode); the call is still made.
    pub async fn request_descriptor(
        &self,
        block_id: &str,
        page_block_id: &str,
        auth_headers: &HashMap<String, String>,
    ) -> Result<BlockFileDescriptor> {
        let body = BlockFileDownloadRequest {
            block_id,
            meta: DownloadMeta {
                name: DOWNLOAD_SOURCE_META_NAME,
            },
            page_block_id,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body);
        for (name, value) in auth_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .context("Failed to request block file download URL")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "getBlockFileDownloadUrl failed with status: {}",
                response.status()
            ));
        }

        response
            .json::<BlockFileDescriptor>()
            .await
            .context("Failed to parse block file download descriptor")
    }
}

/// Mint the authenticated proxy URI for a descriptor
///
/// Query order is fixed: `table`, `id`, `spaceId`, `userId`, `cache`. Missing
/// identifiers are left out and the proxy is expected to reject the request.
#[must_use]
pub fn compose_image_uri(
    api_base_url: &str,
    descriptor_url: &str,
    block_id: &str,
    ids: &SpecialIds,
    cache_version: &str,
) -> String {
    let mut uri = format!(
        "{}{}{}?table=block&id={}",
        api_base_url.trim_end_matches('/'),
        IMAGE_PROXY_PATH,
        urlencoding::encode(descriptor_url),
        urlencoding::encode(block_id)
    );
    if let Some(space_id) = &ids.space_id {
        uri.push_str("&spaceId=");
        uri.push_str(&urlencoding::encode(space_id));
    }
    if let Some(user_id) = &ids.user_id {
        uri.push_str("&userId=");
        uri.push_str(&urlencoding::encode(user_id));
    }
    uri.push_str("&cache=");
    uri.push_str(&urlencoding::encode(cache_version));
    uri
}
