//! Image references discovered on a page
//!
//! Each target element is classified exactly once, here. The rest of the
//! pipeline matches on [`ImageReference`] and never inspects tags again.

use scraper::{ElementRef, Node};

use super::snapshot::{PageSnapshot, closest_block_id};
use crate::error::{ExtractError, Result};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const LABEL_LINE_HEIGHT_EM: f64 = 1.2;

/// Raster `<img>` element captured from the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImageHandle {
    /// Displayed source; frequently proxied or cross-origin
    pub src: String,
    pub alt: Option<String>,
    /// Encoded bytes when the image is already loaded
    pub loaded: Option<Vec<u8>>,
}

impl RasterImageHandle {
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: None,
            loaded: None,
        }
    }

    /// Handle whose bytes are already in memory
    #[must_use]
    pub fn loaded(src: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            src: src.into(),
            alt: None,
            loaded: Some(bytes),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.loaded.is_some()
    }
}

/// Inline `<svg>` diagram captured as standalone XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorGraphicHandle {
    pub id: Option<String>,
    /// Self-contained XML serialization, SVG namespace on the root
    pub markup: String,
}

impl VectorGraphicHandle {
    #[must_use]
    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            id: None,
            markup: markup.into(),
        }
    }

    /// `data:` URI wrapping the markup, percent-encoded
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;charset=utf-8,{}",
            urlencoding::encode(&self.markup)
        )
    }
}

/// An image-bearing element resolved to one of the supported kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Notion-hosted raster image; needs the authenticated round trip
    Hosted {
        element: RasterImageHandle,
        parent_block_id: String,
    },
    /// Inline vector diagram; rasterized locally
    Vector {
        element: VectorGraphicHandle,
        /// Used only as a download file name hint
        parent_block_id: Option<String>,
    },
}

impl ImageReference {
    /// Classify a DOM element, rejecting anything that is neither `<img>` nor `<svg>`
    pub fn from_element(element: ElementRef<'_>) -> Result<Self> {
        let tag = element.value().name();
        let parent_block_id = closest_block_id(element);

        match tag {
            "img" => {
                let Some(parent_block_id) = parent_block_id else {
                    return Err(ExtractError::Resolution(
                        "Could not locate parent block".to_string(),
                    ));
                };
                let value = element.value();
                Ok(Self::Hosted {
                    element: RasterImageHandle {
                        src: value.attr("src").unwrap_or_default().to_string(),
                        alt: value.attr("alt").map(str::to_string),
                        loaded: None,
                    },
                    parent_block_id,
                })
            }
            "svg" => Ok(Self::Vector {
                element: VectorGraphicHandle {
                    id: element.value().attr("id").map(str::to_string),
                    markup: serialize_svg(element),
                },
                parent_block_id,
            }),
            other => Err(ExtractError::UnsupportedElement {
                tag: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn parent_block_id(&self) -> Option<&str> {
        match self {
            Self::Hosted {
                parent_block_id, ..
            } => Some(parent_block_id),
            Self::Vector {
                parent_block_id, ..
            } => parent_block_id.as_deref(),
        }
    }

    #[must_use]
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }
}

/// Every supported target on the page: diagrams first, then raster images
///
/// Elements that cannot be classified are logged and skipped.
#[must_use]
pub fn discover(snapshot: &PageSnapshot) -> Vec<ImageReference> {
    snapshot
        .vector_previews()
        .chain(snapshot.raster_images())
        .filter_map(|el| match ImageReference::from_element(el) {
            Ok(reference) => Some(reference),
            Err(e) => {
                log::warn!("Skipping image target: {e}");
                None
            }
        })
        .collect()
}

/// Serialize an `<svg>` subtree to standalone XML
///
/// HTML serialization of inline SVG is not guaranteed to be well-formed XML and
/// drops the namespace declaration, so the tree is walked and written out here.
/// `foreignObject` HTML labels, which the rasterizer cannot draw, are replaced by
/// SVG `<text>` centred in the object's box.
#[must_use]
pub fn serialize_svg(root: ElementRef<'_>) -> String {
    let mut out = String::with_capacity(4096);
    write_element(root, true, &mut out);
    out
}

fn write_element(element: ElementRef<'_>, is_root: bool, out: &mut String) {
    let value = element.value();
    let name = value.name();
    if name == "foreignObject" {
        write_label(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);

    let mut has_xmlns = false;
    for (attr, attr_value) in value.attrs() {
        if attr == "xmlns" {
            has_xmlns = true;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(attr_value));
        out.push('"');
    }
    if is_root && !has_xmlns {
        out.push_str(" xmlns=\"");
        out.push_str(SVG_NAMESPACE);
        out.push('"');
    }

    let mut children = element.children().peekable();
    if children.peek().is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for child in children {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_element(child_el, false, out);
                }
            }
            Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Text lines of an HTML label; `<br>` and block boundaries start a new line
fn label_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.push(' ');
                    line.push_str(text);
                }
            }
            Node::Element(el) if matches!(el.name(), "br" | "p" | "div") => {
                lines.push(String::new());
            }
            _ => {}
        }
    }
    lines
        .into_iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn length_attr(element: ElementRef<'_>, attr: &str) -> f64 {
    element
        .value()
        .attr(attr)
        .map(|v| v.trim().trim_end_matches("px"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

fn write_label(element: ElementRef<'_>, out: &mut String) {
    let lines = label_lines(element);
    if lines.is_empty() {
        return;
    }

    let cx = length_attr(element, "x") + length_attr(element, "width") / 2.0;
    let cy = length_attr(element, "y") + length_attr(element, "height") / 2.0;
    // Shift up so the block of lines is centred vertically
    let first_dy = (1.0 - lines.len() as f64) * LABEL_LINE_HEIGHT_EM / 2.0;

    out.push_str(&format!(
        r#"<text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="central">"#
    ));
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { first_dy } else { LABEL_LINE_HEIGHT_EM };
        out.push_str(&format!(r#"<tspan x="{cx}" dy="{dy}em">"#));
        out.push_str(&html_escape::encode_text(line));
        out.push_str("</tspan>");
    }
    out.push_str("</text>");
}
