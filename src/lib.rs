//! Extract hosted images and code-block diagrams from Notion pages
//!
//! The pipeline reads page identity from the document, resolves each image
//! to bytes (through Notion's signed-download endpoint for hosted images, or
//! by rasterizing inline SVG for diagrams), and delivers the result as a
//! file or a clipboard entry.

pub mod browser_setup;
pub mod config;
pub mod delivery;
pub mod error;
pub mod extractor;
pub mod live_page;
pub mod page_context;
pub mod rasterizer;
pub mod resolver;
pub mod trigger;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::ExtractorConfig;
pub use delivery::{
    BrowserClipboard, BrowserDownloads, ClipboardPayload, ClipboardWriter, Companions,
    DownloadSink, FileSystemDownloads, OutputDelivery,
};
pub use error::{ExtractError, Result};
pub use extractor::ImageExtractor;
pub use live_page::LivePage;
pub use page_context::{
    ImageReference, PageContextProvider, PageSnapshot, SnapshotContext, SpecialIds, discover,
};
pub use rasterizer::{Bitmap, RasterSource, Rasterizer};
pub use resolver::{ResolvedSource, SourceResolver};
pub use trigger::{annotate_html, install_triggers};
