//! Extraction orchestrator
//!
//! Composes context, resolution, rasterization and delivery for one user
//! action. Holds no state of its own: every call resolves afresh, and
//! concurrent calls on different elements never share anything mutable.

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::delivery::{
    ClipboardPayload, ClipboardWriter, Companions, DownloadSink, OutputDelivery,
};
use crate::error::{ExtractError, Result};
use crate::page_context::{ImageReference, PageContextProvider};
use crate::rasterizer::Rasterizer;
use crate::resolver::{ResolvedSource, SourceResolver};
use crate::utils::DEFAULT_VECTOR_FILENAME;

/// Caller-owned entry point for download and copy actions
#[derive(Clone)]
pub struct ImageExtractor {
    resolver: SourceResolver,
    delivery: OutputDelivery,
}

impl ImageExtractor {
    /// Wire up the pipeline from a config and the page-facing collaborators
    pub fn new(
        config: ExtractorConfig,
        context: Arc<dyn PageContextProvider>,
        downloads: Arc<dyn DownloadSink>,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let rasterizer = Rasterizer::new(&config)?;
        let resolver = SourceResolver::new(Arc::clone(&config), context, rasterizer.clone())?;
        let delivery = OutputDelivery::new(downloads, clipboard, rasterizer);
        Ok(Self::from_parts(resolver, delivery))
    }

    #[must_use]
    pub fn from_parts(resolver: SourceResolver, delivery: OutputDelivery) -> Self {
        Self { resolver, delivery }
    }

    /// Resolve only, without delivering
    pub async fn resolve(&self, reference: &ImageReference) -> Result<ResolvedSource> {
        self.resolver.resolve(reference).await
    }

    /// Resolve `reference` and save it as a file
    pub async fn download_image(&self, reference: &ImageReference) -> Result<PathBuf> {
        let outcome = async {
            let resolved = self.resolver.resolve(reference).await?;
            let name = suggested_file_name(reference, &resolved);
            self.delivery.download(&resolved, Some(name.as_str())).await
        }
        .await;

        log_failure("download", reference, outcome)
    }

    /// Resolve `reference` and place it on the clipboard
    ///
    /// Text companions derived from the element ride along only when
    /// `modifier_held` is set.
    pub async fn copy_image(
        &self,
        reference: &ImageReference,
        modifier_held: bool,
    ) -> Result<ClipboardPayload> {
        let outcome = async {
            let resolved = self.resolver.resolve(reference).await?;
            let companions = companions_for(reference, &resolved);
            self.delivery
                .copy_to_clipboard(&resolved, &companions, modifier_held)
                .await
        }
        .await;

        log_failure("copy", reference, outcome)
    }

    /// Download every diagram among `references` concurrently
    ///
    /// Each download stands alone; a failure is reported in its slot and does
    /// not stop the others.
    pub async fn download_all_vector_graphics(
        &self,
        references: &[ImageReference],
    ) -> Vec<Result<PathBuf>> {
        let futures = references
            .iter()
            .filter(|reference| reference.is_vector())
            .map(|reference| self.download_image(reference));

        let results = join_all(futures).await;
        let failures = results.iter().filter(|r| r.is_err()).count();
        log::info!(
            "Downloaded {} of {} diagram(s)",
            results.len() - failures,
            results.len()
        );
        results
    }
}

/// File name hint for a download
///
/// Hosted images are named after their probed type; diagrams after their
/// owning block.
#[must_use]
pub fn suggested_file_name(reference: &ImageReference, resolved: &ResolvedSource) -> String {
    match reference {
        ImageReference::Hosted { .. } => format!("image.{}", resolved.extension),
        ImageReference::Vector {
            parent_block_id, ..
        } => parent_block_id
            .as_deref()
            .map(|block_id| format!("{block_id}.{}", resolved.extension))
            .unwrap_or_else(|| DEFAULT_VECTOR_FILENAME.to_string()),
    }
}

/// Text representations describing the copied image
#[must_use]
pub fn companions_for(reference: &ImageReference, resolved: &ResolvedSource) -> Companions {
    match reference {
        ImageReference::Hosted { element, .. } => Companions {
            plain_text: Some(resolved.uri.clone()),
            html: Some(format!(
                "<img src=\"{}\" alt=\"{}\">",
                html_escape::encode_double_quoted_attribute(&resolved.uri),
                html_escape::encode_double_quoted_attribute(element.alt.as_deref().unwrap_or_default())
            )),
        },
        // Data URIs are too large to be useful as text
        ImageReference::Vector { element, .. } => Companions {
            plain_text: element.id.clone(),
            html: None,
        },
    }
}

fn log_failure<T>(action: &str, reference: &ImageReference, outcome: Result<T>) -> Result<T> {
    if let Err(e) = &outcome {
        let block = reference.parent_block_id().unwrap_or("<unknown block>");
        match e {
            ExtractError::Context(_) => log::error!("{action} failed for {block} [{}]: {e}", e.kind()),
            _ => log::warn!("{action} failed for {block} [{}]: {e}", e.kind()),
        }
    }
    outcome
}
