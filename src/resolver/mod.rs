//! Source resolution: element reference → deliverable bytes
//!
//! Hosted images take two network round trips (descriptor, then the minted
//! URI, whose `content-type` is the only trustworthy format signal). Vector
//! diagrams never touch the network.

pub mod backend;
pub mod fetch;
pub mod types;

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::page_context::{
    ImageReference, PageContextProvider, RasterImageHandle, VectorGraphicHandle, auth_headers_for,
};
use crate::rasterizer::{RasterSource, Rasterizer};
use crate::utils::PNG_MIME;

pub use backend::{BlockFileClient, BlockFileDescriptor, compose_image_uri};
pub use fetch::{FetchedResource, build_anonymous_client, build_session_client, fetch_bytes};
pub use types::{ResolvedSource, extension_for, normalize_mime};

/// Resolves [`ImageReference`]s against the current page context
#[derive(Clone)]
pub struct SourceResolver {
    config: Arc<ExtractorConfig>,
    context: Arc<dyn PageContextProvider>,
    backend: BlockFileClient,
    session_client: Client,
    rasterizer: Rasterizer,
}

impl SourceResolver {
    pub fn new(
        config: Arc<ExtractorConfig>,
        context: Arc<dyn PageContextProvider>,
        rasterizer: Rasterizer,
    ) -> Result<Self> {
        let session_client =
            build_session_client(&config).map_err(|e| ExtractError::Config(format!("{e:#}")))?;
        let backend = BlockFileClient::new(
            session_client.clone(),
            config.block_file_download_url(),
            config.request_timeout(),
        );
        Ok(Self {
            config,
            context,
            backend,
            session_client,
            rasterizer,
        })
    }

    /// Resolve a reference to a concrete source
    pub async fn resolve(&self, reference: &ImageReference) -> Result<ResolvedSource> {
        match reference {
            ImageReference::Hosted {
                element,
                parent_block_id,
            } => self.resolve_hosted(element, parent_block_id).await,
            ImageReference::Vector { element, .. } => self.resolve_vector(element).await,
        }
    }

    async fn resolve_hosted(
        &self,
        element: &RasterImageHandle,
        block_id: &str,
    ) -> Result<ResolvedSource> {
        if block_id.trim().is_empty() {
            return Err(ExtractError::Resolution(
                "Could not locate parent block".to_string(),
            ));
        }

        let page_id = self.context.page_id()?;
        let ids = self.context.special_ids();
        let auth_headers = auth_headers_for(&ids);
        if auth_headers.is_empty() && self.config.require_auth_headers() {
            return Err(ExtractError::Resolution(
                "Space and user identifiers are required but missing from the page".to_string(),
            ));
        }

        log::debug!("Requesting download descriptor for block {block_id} (displayed as {})", element.src);
        let descriptor = self
            .backend
            .request_descriptor(block_id, &page_id, &auth_headers)
            .await
            .map_err(|e| ExtractError::Resolution(format!("{e:#}")))?;

        let uri = compose_image_uri(
            self.config.api_base_url(),
            &descriptor.url,
            block_id,
            &ids,
            self.config.cache_version(),
        );

        // Fetch image to get mime
        let fetched = fetch_bytes(
            &self.session_client,
            &uri,
            &HashMap::new(),
            self.config.image_timeout(),
            self.config.max_image_size(),
        )
        .await
        .map_err(|e| ExtractError::Resolution(format!("{e:#}")))?;

        let resolved = ResolvedSource::new(uri, fetched.content_type.as_deref(), fetched.bytes);
        log::info!(
            "Resolved hosted image for block {block_id}: {} ({} bytes)",
            resolved.mime,
            resolved.bytes.len()
        );
        Ok(resolved)
    }

    async fn resolve_vector(&self, element: &VectorGraphicHandle) -> Result<ResolvedSource> {
        let bitmap = self
            .rasterizer
            .rasterize(RasterSource::Uri(element.to_data_uri()))
            .await?;
        let bytes = bitmap.to_png()?;
        let uri = crate::rasterizer::encode_data_uri(PNG_MIME, &bytes);

        log::info!(
            "Rasterized diagram {} to {}x{} PNG",
            element.id.as_deref().unwrap_or("<unnamed>"),
            bitmap.width(),
            bitmap.height()
        );
        Ok(ResolvedSource::new(uri, Some(PNG_MIME), bytes))
    }

    /// Rasterizer shared with delivery for format conversion
    #[must_use]
    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }
}
