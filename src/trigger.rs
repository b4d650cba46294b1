//! Trigger affordance installation
//!
//! Adds a small download button next to every image target in a page. A
//! per-parent marker check makes repeated installation a no-op, so the
//! installer can run after every re-render.

use anyhow::{Context, Result};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use crate::page_context::{BLOCK_ID_ATTR, RASTER_IMAGE_CSS, VECTOR_PREVIEW_CSS};
use crate::utils::TRIGGER_CLASS;

/// Attribute on a trigger naming the block it acts on
pub const TRIGGER_TARGET_ATTR: &str = "data-extract-target";

const TRIGGER_STYLE: &str =
    "position: absolute; top: 30px; right: 30px; background-color: #ff7676; padding: 8px; cursor: pointer;";

/// Install triggers into a parsed document, returning how many were added
pub fn install_triggers(document: &NodeRef) -> Result<usize> {
    let marker = format!(".{TRIGGER_CLASS}");
    let mut installed = 0;

    for css in [VECTOR_PREVIEW_CSS, RASTER_IMAGE_CSS] {
        // Collect before mutating: appending triggers invalidates a live iterator
        let targets: Vec<_> = document
            .select(css)
            .map_err(|()| anyhow::anyhow!("Invalid target selector '{css}'"))?
            .collect();

        for target in targets {
            let Some(parent) = target.as_node().parent() else {
                continue;
            };

            let already_installed = parent
                .select(&marker)
                .map_err(|()| anyhow::anyhow!("Invalid marker selector '{marker}'"))?
                .next()
                .is_some();
            if already_installed {
                continue;
            }

            let block_id = closest_block_id(target.as_node()).unwrap_or_default();
            parent.append(trigger_node(&block_id)?);
            installed += 1;
        }
    }

    log::debug!("Installed {installed} trigger affordance(s)");
    Ok(installed)
}

/// Parse `html`, install triggers, and serialize it back
pub fn annotate_html(html: &str) -> Result<(String, usize)> {
    let document = kuchiki::parse_html().one(html);
    let installed = install_triggers(&document)?;

    let mut output = Vec::new();
    document
        .serialize(&mut output)
        .context("Failed to serialize HTML after installing triggers")?;
    let html = String::from_utf8(output).context("Failed to convert HTML bytes to UTF-8 string")?;
    Ok((html, installed))
}

fn closest_block_id(node: &NodeRef) -> Option<String> {
    node.inclusive_ancestors().find_map(|ancestor| {
        ancestor
            .as_element()
            .and_then(|el| el.attributes.borrow().get(BLOCK_ID_ATTR).map(str::to_string))
            .filter(|id| !id.is_empty())
    })
}

fn trigger_node(block_id: &str) -> Result<NodeRef> {
    let trigger_html = format!(
        r#"<div class="{TRIGGER_CLASS}" {TRIGGER_TARGET_ATTR}="{}" style="{TRIGGER_STYLE}"><span aria-hidden="true">💾</span></div>"#,
        html_escape::encode_double_quoted_attribute(block_id)
    );
    let fragment = kuchiki::parse_html().one(trigger_html);
    let selector = format!("div.{TRIGGER_CLASS}");
    let trigger = fragment
        .select_first(&selector)
        .map_err(|()| anyhow::anyhow!("Trigger markup did not parse"))?;

    let node = trigger.as_node().clone();
    node.detach();
    Ok(node)
}
