//! In-memory bitmap surfaces

use resvg::tiny_skia::Pixmap;

use super::data_uri::encode_data_uri;
use crate::error::{ExtractError, Result};
use crate::utils::{MAX_SURFACE_DIMENSION, PNG_MIME};

/// Allocate a transparent drawing surface of exactly `width` x `height`
///
/// Zero-sized, oversized, or unallocatable surfaces are rasterization errors.
pub fn create_surface(width: u32, height: u32) -> Result<Pixmap> {
    if width == 0 || height == 0 {
        return Err(ExtractError::Rasterization(format!(
            "Cannot create {width}x{height} surface: source has no intrinsic size"
        )));
    }
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(ExtractError::Rasterization(format!(
            "Cannot create {width}x{height} surface: exceeds {MAX_SURFACE_DIMENSION}px limit"
        )));
    }
    Pixmap::new(width, height).ok_or_else(|| {
        ExtractError::Rasterization(format!("Failed to allocate {width}x{height} surface"))
    })
}

/// Rendered pixels, always exportable
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Bitmap {
    pub(crate) fn new(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| ExtractError::Rasterization(format!("PNG encoding failed: {e}")))
    }

    /// Encode as a `data:image/png;base64,...` URI
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(encode_data_uri(PNG_MIME, &self.to_png()?))
    }
}
