//! Read-only DOM snapshot of a Notion page
//!
//! A snapshot is the serialized HTML of the live document at one instant. All
//! queries the pipeline needs (page block, identifier-bearing images, image
//! targets) run against it, so tests can feed synthetic documents without a browser.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

// CSS Selectors are parsed once at first access and cached forever.
// Hardcoded selectors should NEVER fail to parse - if they do, it's a compile-time bug.
static PAGE_BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".notion-page-block[data-block-id]")
        .expect("BUG: hardcoded CSS selector '.notion-page-block[data-block-id]' is invalid")
});

static SPACE_ID_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"img[src*="/image/"][src*="spaceId="]"#)
        .expect("BUG: hardcoded CSS selector for spaceId images is invalid")
});

static USER_ID_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"img[src*="/image/"][src*="userId="]"#)
        .expect("BUG: hardcoded CSS selector for userId images is invalid")
});

/// Inline diagram previews inside code blocks
pub const VECTOR_PREVIEW_CSS: &str = "main .notion-code-block svg[id]";

/// Raster images inside content blocks
pub const RASTER_IMAGE_CSS: &str = "main [data-block-id] img";

static VECTOR_PREVIEW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(VECTOR_PREVIEW_CSS)
        .expect("BUG: hardcoded CSS selector VECTOR_PREVIEW_CSS is invalid")
});

static RASTER_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(RASTER_IMAGE_CSS)
        .expect("BUG: hardcoded CSS selector RASTER_IMAGE_CSS is invalid")
});

/// Attribute tying an on-page element to its backend block
pub const BLOCK_ID_ATTR: &str = "data-block-id";

/// Parsed page document
pub struct PageSnapshot {
    document: Html,
}

impl PageSnapshot {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Block id of the top-level page heading block, if rendered
    #[must_use]
    pub fn page_block_id(&self) -> Option<String> {
        self.document
            .select(&PAGE_BLOCK_SELECTOR)
            .next()
            .and_then(|el| el.value().attr(BLOCK_ID_ATTR))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// `src` of the first proxied image carrying a `spaceId` query parameter
    #[must_use]
    pub fn space_id_image_src(&self) -> Option<&str> {
        self.first_src(&SPACE_ID_IMAGE_SELECTOR)
    }

    /// `src` of the first proxied image carrying a `userId` query parameter
    #[must_use]
    pub fn user_id_image_src(&self) -> Option<&str> {
        self.first_src(&USER_ID_IMAGE_SELECTOR)
    }

    /// Inline diagram previews rendered inside code blocks, in document order
    pub fn vector_previews(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.select(&VECTOR_PREVIEW_SELECTOR)
    }

    /// Raster images inside content blocks, in document order
    pub fn raster_images(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.select(&RASTER_IMAGE_SELECTOR)
    }

    fn first_src(&self, selector: &Selector) -> Option<&str> {
        self.document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("src"))
    }
}

/// Block id of the element itself or its nearest ancestor carrying one
#[must_use]
pub fn closest_block_id(element: ElementRef<'_>) -> Option<String> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find_map(|el| el.value().attr(BLOCK_ID_ATTR))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
