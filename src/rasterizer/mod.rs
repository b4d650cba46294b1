//! Vector and raster rendering into exportable bitmaps
//!
//! Remote sources are loaded anonymously (no cookies, no auth headers), the
//! counterpart of requesting `crossOrigin = "anonymous"` in a browser: the
//! resulting pixels never depend on credentials and can always be exported.
//!
//! The target surface is sized to the source's natural dimensions and the
//! source is drawn once at the origin. Nothing is scaled.

pub mod bitmap;
pub mod data_uri;

use reqwest::Client;
use resvg::tiny_skia::{ColorU8, PixmapPaint, Transform};
use resvg::usvg;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::page_context::RasterImageHandle;
use crate::resolver::fetch::{build_anonymous_client, fetch_bytes};
use crate::utils::is_fetchable_url;

pub use bitmap::{Bitmap, create_surface};
pub use data_uri::{DataUri, decode_data_uri, encode_data_uri};

// Font discovery is slow; done once per process and shared by every render.
static FONT_DB: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("Loaded {} font faces for SVG text rendering", db.len());
    Arc::new(db)
});

/// What to rasterize
#[derive(Debug, Clone)]
pub enum RasterSource {
    /// `data:` URI or http(s) URL
    Uri(String),
    /// Image element, possibly already loaded
    Element(RasterImageHandle),
    /// Encoded bytes with the MIME type they were served as
    Bytes { bytes: Vec<u8>, mime: Option<String> },
}

/// Renders sources into [`Bitmap`]s
#[derive(Debug, Clone)]
pub struct Rasterizer {
    client: Client,
    timeout: Duration,
    max_size: usize,
}

impl Rasterizer {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = build_anonymous_client(config)
            .map_err(|e| ExtractError::Config(format!("{e:#}")))?;
        Ok(Self {
            client,
            timeout: config.image_timeout(),
            max_size: config.max_image_size(),
        })
    }

    /// Render `source` at its natural size
    ///
    /// Already-loaded handles and `data:` URIs are decoded without suspending;
    /// remote sources suspend once, on the fetch.
    pub async fn rasterize(&self, source: RasterSource) -> Result<Bitmap> {
        let (bytes, mime) = match source {
            RasterSource::Uri(uri) => self.load(&uri).await?,
            RasterSource::Element(handle) => match handle.loaded {
                Some(bytes) => (bytes, None),
                None => self.load(&handle.src).await?,
            },
            RasterSource::Bytes { bytes, mime } => (bytes, mime),
        };
        render(&bytes, mime.as_deref())
    }

    async fn load(&self, uri: &str) -> Result<(Vec<u8>, Option<String>)> {
        if uri.starts_with("data:") {
            let DataUri { mime, bytes } = decode_data_uri(uri)?;
            return Ok((bytes, mime));
        }
        if !is_fetchable_url(uri) {
            return Err(ExtractError::Rasterization(format!(
                "Cannot load image source '{uri}'"
            )));
        }

        log::debug!("Loading image anonymously: {uri}");
        let fetched = fetch_bytes(&self.client, uri, &HashMap::new(), self.timeout, self.max_size)
            .await
            .map_err(|e| ExtractError::Rasterization(format!("{e:#}")))?;
        Ok((fetched.bytes, fetched.content_type))
    }
}

/// Decode encoded image bytes and draw them onto a fresh surface
///
/// The declared MIME type picks the decoder; when it fails, the other decoder
/// is tried and the first error is kept if both fail.
pub fn render(bytes: &[u8], mime: Option<&str>) -> Result<Bitmap> {
    let as_svg = match mime {
        Some(mime) => mime.starts_with("image/svg"),
        None => looks_like_svg(bytes),
    };

    match render_as(bytes, as_svg) {
        Ok(bitmap) => Ok(bitmap),
        Err(e) => {
            log::debug!("Decoding as {} failed, retrying: {e}", kind_name(as_svg));
            render_as(bytes, !as_svg).map_err(|_| e)
        }
    }
}

fn render_as(bytes: &[u8], as_svg: bool) -> Result<Bitmap> {
    if as_svg {
        render_svg(bytes)
    } else {
        render_raster(bytes)
    }
}

fn kind_name(as_svg: bool) -> &'static str {
    if as_svg { "SVG" } else { "bitmap" }
}

// Optional BOM, then any mix of whitespace, XML declaration, comments and
// doctype before the root element.
static SVG_PROLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^\x{FEFF}?(?:\s+|<\?xml.*?\?>|<!--.*?-->|<!DOCTYPE[^\[>]*(?:\[.*?\])?\s*>)*<svg[\s>/]",
    )
    .expect("BUG: hardcoded SVG prolog regex is invalid")
});

const SNIFF_LEN: usize = 4096;

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LEN)]);
    SVG_PROLOG.is_match(&head)
}

fn render_svg(bytes: &[u8]) -> Result<Bitmap> {
    let options = usvg::Options {
        fontdb: Arc::clone(&FONT_DB),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_data(bytes, &options)
        .map_err(|e| ExtractError::Rasterization(format!("Failed to parse SVG: {e}")))?;

    let size = tree.size().to_int_size();
    let mut surface = create_surface(size.width(), size.height())?;
    resvg::render(&tree, Transform::identity(), &mut surface.as_mut());

    log::debug!("Rasterized SVG at {}x{}", size.width(), size.height());
    Ok(Bitmap::new(surface))
}

fn render_raster(bytes: &[u8]) -> Result<Bitmap> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ExtractError::Rasterization(format!("Failed to decode image: {e}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();

    let mut source = create_surface(width, height)?;
    for (dst, px) in source.pixels_mut().iter_mut().zip(decoded.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    let mut surface = create_surface(width, height)?;
    surface.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    log::debug!("Rasterized bitmap image at {width}x{height}");
    Ok(Bitmap::new(surface))
}
