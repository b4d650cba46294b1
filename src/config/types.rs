//! Core configuration types for image extraction
//!
//! This module contains the `ExtractorConfig` struct that defines how the
//! extractor talks to the Notion backend, where downloads land, and how the
//! browser session is launched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for extraction sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Directory receiving downloaded files.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    pub(crate) output_dir: PathBuf,

    /// Origin serving `/api/v3/*` and the `/image/` proxy
    pub(crate) api_base_url: String,

    /// Session token sent as the `token_v2` cookie.
    ///
    /// Never serialized, so configs can be logged or persisted safely.
    #[serde(skip)]
    pub(crate) session_token: Option<String>,

    /// Cache version token appended to minted image URIs
    pub(crate) cache_version: String,

    /// Timeout in seconds for the descriptor request
    ///
    /// Default: 30 seconds
    pub(crate) request_timeout_secs: u64,

    /// Timeout in seconds for image byte fetches
    ///
    /// Default: 60 seconds
    pub(crate) image_timeout_secs: u64,

    /// Maximum accepted image size in bytes
    pub(crate) max_image_size: usize,

    /// Fail hosted resolutions locally when auth identifiers are missing,
    /// instead of sending the request unauthenticated.
    ///
    /// Default: false
    pub(crate) require_auth_headers: bool,

    pub(crate) user_agent: String,
    pub(crate) headless: bool,

    /// Browser profile directory; reusing one keeps the Notion login
    pub(crate) chrome_data_dir: Option<PathBuf>,
}
