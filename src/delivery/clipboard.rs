//! Clipboard payloads and writers
//!
//! Consuming applications often prefer a text or markup entry over an image
//! entry when both are present, so companions travel only when explicitly
//! requested with the modifier.

use base64::Engine;
use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use std::collections::BTreeMap;

use super::download::DeliveryFuture;
use super::js_scripts::clipboard_write_script;
use crate::error::ExtractError;
use crate::utils::PNG_MIME;

pub const TEXT_PLAIN_MIME: &str = "text/plain";
pub const TEXT_HTML_MIME: &str = "text/html";

/// Optional text representations offered alongside the image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Companions {
    pub plain_text: Option<String>,
    pub html: Option<String>,
}

/// MIME type → bytes, exactly one `image/png` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ClipboardPayload {
    /// Build the payload for one copy action
    ///
    /// Without `modifier_held` the payload is the image alone, whatever
    /// companions were supplied.
    #[must_use]
    pub fn build(png: Vec<u8>, companions: &Companions, modifier_held: bool) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PNG_MIME.to_string(), png);

        if modifier_held {
            if let Some(text) = &companions.plain_text {
                entries.insert(TEXT_PLAIN_MIME.to_string(), text.as_bytes().to_vec());
            }
            if let Some(html) = &companions.html {
                entries.insert(TEXT_HTML_MIME.to_string(), html.as_bytes().to_vec());
            }
        } else if companions.plain_text.is_some() || companions.html.is_some() {
            log::debug!("Dropping text companions: modifier not held");
        }

        Self { entries }
    }

    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, mime: &str) -> Option<&[u8]> {
        self.entries.get(mime).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(mime, bytes)| (mime.as_str(), bytes.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Platform clipboard
pub trait ClipboardWriter: Send + Sync {
    /// Replace the clipboard contents with `payload`.
    ///
    /// Rejections must surface as [`ExtractError::Clipboard`].
    fn write<'a>(&'a self, payload: &'a ClipboardPayload) -> DeliveryFuture<'a, ()>;
}

/// Writes through the page's async clipboard API
///
/// The evaluation is flagged as a user gesture and awaits the write promise,
/// keeping the write inside the gesture's permission window.
#[derive(Clone)]
pub struct BrowserClipboard {
    page: Page,
}

impl BrowserClipboard {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    fn script_for(payload: &ClipboardPayload) -> String {
        let entries = payload
            .iter()
            .map(|(mime, bytes)| {
                (
                    mime.to_string(),
                    serde_json::Value::String(
                        base64::engine::general_purpose::STANDARD.encode(bytes),
                    ),
                )
            })
            .collect();
        clipboard_write_script(&entries)
    }
}

impl ClipboardWriter for BrowserClipboard {
    fn write<'a>(&'a self, payload: &'a ClipboardPayload) -> DeliveryFuture<'a, ()> {
        Box::pin(async move {
            let params = EvaluateParams::builder()
                .expression(Self::script_for(payload))
                .await_promise(true)
                .user_gesture(true)
                .return_by_value(true)
                .build()
                .map_err(|e| ExtractError::Clipboard(format!("Invalid evaluation: {e}")))?;

            self.page
                .evaluate_expression(params)
                .await
                .map_err(|e| ExtractError::Clipboard(e.to_string()))?;

            log::info!(
                "Wrote clipboard item with {} representation(s)",
                payload.len()
            );
            Ok(())
        })
    }
}
