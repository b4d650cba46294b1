//! Output delivery: file downloads and clipboard writes

pub mod clipboard;
pub mod download;
pub mod js_scripts;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::rasterizer::{RasterSource, Rasterizer};
use crate::resolver::ResolvedSource;
use crate::utils::download_file_name;

pub use clipboard::{
    BrowserClipboard, ClipboardPayload, ClipboardWriter, Companions, TEXT_HTML_MIME,
    TEXT_PLAIN_MIME,
};
pub use download::{BrowserDownloads, DeliveryFuture, DownloadSink, FileSystemDownloads};

/// Hands resolved sources to the download sink or the clipboard
#[derive(Clone)]
pub struct OutputDelivery {
    downloads: Arc<dyn DownloadSink>,
    clipboard: Arc<dyn ClipboardWriter>,
    rasterizer: Rasterizer,
}

impl OutputDelivery {
    #[must_use]
    pub fn new(
        downloads: Arc<dyn DownloadSink>,
        clipboard: Arc<dyn ClipboardWriter>,
        rasterizer: Rasterizer,
    ) -> Self {
        Self {
            downloads,
            clipboard,
            rasterizer,
        }
    }

    /// Save `resolved` under the suggested name, the URI's tail segment, or the URI
    pub async fn download(
        &self,
        resolved: &ResolvedSource,
        suggested_name: Option<&str>,
    ) -> Result<PathBuf> {
        let file_name = download_file_name(&resolved.uri, suggested_name);
        let path = self.downloads.save(&file_name, resolved).await?;
        log::info!(
            "Downloaded {} ({} bytes) to {}",
            resolved.mime,
            resolved.bytes.len(),
            path.display()
        );
        Ok(path)
    }

    /// Copy `resolved` as `image/png`, with companions only when `modifier_held`
    ///
    /// Non-PNG sources are converted first; the conversion happens before the
    /// write, within the same invocation.
    pub async fn copy_to_clipboard(
        &self,
        resolved: &ResolvedSource,
        companions: &Companions,
        modifier_held: bool,
    ) -> Result<ClipboardPayload> {
        let png = if resolved.is_png() {
            resolved.bytes.clone()
        } else {
            log::debug!("Converting {} to image/png for the clipboard", resolved.mime);
            let source = RasterSource::Bytes {
                bytes: resolved.bytes.clone(),
                mime: Some(resolved.mime.clone()),
            };
            self.rasterizer
                .rasterize(source)
                .await?
                .to_png()?
        };

        let payload = ClipboardPayload::build(png, companions, modifier_held);
        self.clipboard.write(&payload).await?;
        Ok(payload)
    }
}
