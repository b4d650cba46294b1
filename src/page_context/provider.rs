//! Page-scoped authentication context
//!
//! Identifiers are re-derived on every call: the document mutates while the
//! user navigates, so nothing here is cached.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::snapshot::PageSnapshot;
use crate::error::{ExtractError, Result};
use crate::utils::{ACTIVE_USER_HEADER, SPACE_ID_HEADER};

static SPACE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)spaceId=([a-z0-9-]+)").expect("BUG: hardcoded spaceId regex is invalid")
});

static USER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)userId=([a-z0-9-]+)").expect("BUG: hardcoded userId regex is invalid")
});

/// Best-effort identifiers scraped from proxied image URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialIds {
    pub space_id: Option<String>,
    pub user_id: Option<String>,
}

/// Identity of the current page plus the optional auth identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page_id: String,
    pub space_id: Option<String>,
    pub user_id: Option<String>,
}

/// Source of page identity for authenticated backend calls
pub trait PageContextProvider: Send + Sync {
    /// Block id of the page itself. Fails with [`ExtractError::Context`] when absent.
    fn page_id(&self) -> Result<String>;

    /// Space and user ids, each independently optional
    fn special_ids(&self) -> SpecialIds;

    /// Auth header pair, or an empty map when either identifier is missing
    fn auth_headers(&self) -> HashMap<String, String> {
        auth_headers_for(&self.special_ids())
    }

    fn page_context(&self) -> Result<PageContext> {
        let page_id = self.page_id()?;
        let SpecialIds { space_id, user_id } = self.special_ids();
        Ok(PageContext {
            page_id,
            space_id,
            user_id,
        })
    }
}

/// Build the auth header pair from already-derived identifiers
///
/// Degrades to an empty map with a warning; callers must tolerate the
/// downstream request failing instead.
#[must_use]
pub fn auth_headers_for(ids: &SpecialIds) -> HashMap<String, String> {
    match (&ids.space_id, &ids.user_id) {
        (Some(space_id), Some(user_id)) => HashMap::from([
            (SPACE_ID_HEADER.to_string(), space_id.clone()),
            (ACTIVE_USER_HEADER.to_string(), user_id.clone()),
        ]),
        _ => {
            log::warn!(
                "Could not extract special notion headers (spaceId: {}, userId: {})",
                ids.space_id.is_some(),
                ids.user_id.is_some()
            );
            HashMap::new()
        }
    }
}

/// Extract a single capture group from an image `src`
fn capture_id(re: &Regex, src: Option<&str>) -> Option<String> {
    src.and_then(|s| re.captures(s))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Derive identifiers from a parsed snapshot
#[must_use]
pub fn special_ids_from(snapshot: &PageSnapshot) -> SpecialIds {
    SpecialIds {
        space_id: capture_id(&SPACE_ID_RE, snapshot.space_id_image_src()),
        user_id: capture_id(&USER_ID_RE, snapshot.user_id_image_src()),
    }
}

/// Context provider backed by the latest HTML snapshot of the page
///
/// A live browser session calls [`SnapshotContext::refresh`] after navigation
/// or re-render; every query parses the current snapshot afresh.
pub struct SnapshotContext {
    html: RwLock<String>,
}

impl SnapshotContext {
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: RwLock::new(html.into()),
        }
    }

    /// Replace the snapshot with the document's current HTML
    pub fn refresh(&self, html: impl Into<String>) {
        *self.html.write() = html.into();
    }

    /// Parse the current snapshot
    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::parse(&self.html.read())
    }
}

impl PageContextProvider for SnapshotContext {
    fn page_id(&self) -> Result<String> {
        // Page block should also be the very first element with a data-block-id attr
        self.snapshot()
            .page_block_id()
            .ok_or_else(|| ExtractError::Context("Could not locate page ID".to_string()))
    }

    fn special_ids(&self) -> SpecialIds {
        special_ids_from(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_need_both_ids() {
        let partial = SpecialIds {
            space_id: Some("s1".to_string()),
            user_id: None,
        };
        assert!(auth_headers_for(&partial).is_empty());

        let full = SpecialIds {
            space_id: Some("s1".to_string()),
            user_id: Some("u1".to_string()),
        };
        let headers = auth_headers_for(&full);
        assert_eq!(headers.get(SPACE_ID_HEADER).map(String::as_str), Some("s1"));
        assert_eq!(headers.get(ACTIVE_USER_HEADER).map(String::as_str), Some("u1"));
    }

    #[test]
    fn capture_is_case_insensitive() {
        let id = capture_id(&SPACE_ID_RE, Some("/image/a?SPACEID=Ab-12&x=1"));
        assert_eq!(id.as_deref(), Some("Ab-12"));
    }
}
