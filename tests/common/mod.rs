//! Shared fixtures for the notion_image_extractor test suite

use mockito::{Mock, Server};
use notion_image_extractor::config::ExtractorConfig;
use notion_image_extractor::delivery::{
    ClipboardPayload, ClipboardWriter, DeliveryFuture, FileSystemDownloads,
};
use notion_image_extractor::error::ExtractError;
use notion_image_extractor::page_context::SnapshotContext;
use notion_image_extractor::ImageExtractor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A small SVG diagram with explicit pixel dimensions
#[allow(dead_code)]
pub const DIAGRAM_SVG: &str = r##"<svg id="mermaid-1" width="120" height="80" viewBox="0 0 120 80"><rect x="10" y="10" width="100" height="60" fill="#3366cc"></rect></svg>"##;

/// Builds Notion-shaped page HTML
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct PageFixture {
    page_block_id: Option<String>,
    space_id: Option<String>,
    user_id: Option<String>,
    blocks: Vec<String>,
}

#[allow(dead_code)]
impl PageFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_block(mut self, id: &str) -> Self {
        self.page_block_id = Some(id.to_string());
        self
    }

    /// Adds a proxied image carrying both identifiers in its query string
    pub fn identifiers(mut self, space_id: &str, user_id: &str) -> Self {
        self.space_id = Some(space_id.to_string());
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn hosted_image(mut self, block_id: &str, src: &str, alt: &str) -> Self {
        self.blocks.push(format!(
            r#"<div class="notion-image-block" data-block-id="{block_id}"><div><img src="{src}" alt="{alt}"></div></div>"#
        ));
        self
    }

    pub fn diagram(mut self, block_id: &str, svg: &str) -> Self {
        self.blocks.push(format!(
            r#"<div class="notion-code-block" data-block-id="{block_id}"><div class="preview">{svg}</div></div>"#
        ));
        self
    }

    /// Diagram in a code block that carries no block id
    pub fn unowned_diagram(mut self, svg: &str) -> Self {
        self.blocks.push(format!(
            r#"<div class="notion-code-block"><div class="preview">{svg}</div></div>"#
        ));
        self
    }

    pub fn build(&self) -> String {
        let page_block = self
            .page_block_id
            .as_deref()
            .map(|id| format!(r#"<div class="notion-page-block" data-block-id="{id}"><h1>Title</h1></div>"#))
            .unwrap_or_default();

        let identifier_image = match (&self.space_id, &self.user_id) {
            (Some(space), Some(user)) => format!(
                r#"<img class="icon" src="/image/https%3A%2F%2Fs3%2Ficon.png?table=space&spaceId={space}&userId={user}&cache=v2">"#
            ),
            _ => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Fixture</title></head>
<body>
<nav>{identifier_image}</nav>
<main>
{page_block}
{}
</main>
</body>
</html>"#,
            self.blocks.join("\n")
        )
    }

    pub fn context(&self) -> Arc<SnapshotContext> {
        Arc::new(SnapshotContext::new(self.build()))
    }
}

/// Clipboard that records payloads instead of touching the system
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<ClipboardPayload>>,
    reject: bool,
}

#[allow(dead_code)]
impl MemoryClipboard {
    pub fn rejecting() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn writes(&self) -> Vec<ClipboardPayload> {
        self.writes.lock().clone()
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write<'a>(&'a self, payload: &'a ClipboardPayload) -> DeliveryFuture<'a, ()> {
        Box::pin(async move {
            if self.reject {
                return Err(ExtractError::Clipboard("permission denied".to_string()));
            }
            self.writes.lock().push(payload.clone());
            Ok(())
        })
    }
}

/// Config pointed at a mock backend, writing into `dir`
#[allow(dead_code)]
pub fn test_config(server: &Server, dir: &Path) -> ExtractorConfig {
    ExtractorConfig::builder()
        .api_base_url(server.url())
        .session_token("test-token")
        .request_timeout_secs(5)
        .image_timeout_secs(5)
        .output_dir(dir)
        .build()
        .expect("test config is valid")
}

/// Extractor wired to a page fixture, a temp download dir and a memory clipboard
#[allow(dead_code)]
pub fn test_extractor(
    config: ExtractorConfig,
    page: &PageFixture,
    clipboard: Arc<MemoryClipboard>,
) -> ImageExtractor {
    let downloads = Arc::new(FileSystemDownloads::new(config.output_dir().clone()));
    ImageExtractor::new(config, page.context(), downloads, clipboard).expect("extractor builds")
}

/// Mock for the signed-download descriptor endpoint
#[allow(dead_code)]
pub async fn create_descriptor_mock(server: &mut Server, url: &str) -> Mock {
    server
        .mock("POST", "/api/v3/getBlockFileDownloadUrl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "url": url }).to_string())
        .create_async()
        .await
}

/// Encode a solid-color PNG of the given size
#[allow(dead_code)]
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encodes");
    bytes
}

/// Creates a temporary directory for test output
#[allow(dead_code)]
pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}
