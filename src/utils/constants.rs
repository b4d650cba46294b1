//! Shared constants for notion-image-extractor
//!
//! Default values and fixed protocol strings used throughout the codebase.

/// Default Notion origin serving both the API and the image proxy
pub const DEFAULT_API_BASE_URL: &str = "https://www.notion.so";

/// Path of the signed-download descriptor endpoint, relative to the API base
pub const BLOCK_FILE_DOWNLOAD_PATH: &str = "/api/v3/getBlockFileDownloadUrl";

/// Path prefix of the authenticated image proxy
pub const IMAGE_PROXY_PATH: &str = "/image/";

/// Cache version token appended to every minted image URI
pub const DEFAULT_CACHE_VERSION: &str = "v2";

/// `meta.name` value sent with descriptor requests
pub const DOWNLOAD_SOURCE_META_NAME: &str = "downloadSource";

/// Header carrying the active space identifier
pub const SPACE_ID_HEADER: &str = "x-notion-space-id";

/// Header carrying the active user identifier
pub const ACTIVE_USER_HEADER: &str = "x-notion-active-user-header";

/// Cookie holding the Notion session token
pub const SESSION_COOKIE_NAME: &str = "token_v2";

/// Content type assumed when the image proxy omits one
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// The single image representation placed on the clipboard
pub const PNG_MIME: &str = "image/png";

/// File name used for diagrams whose owning block is unknown
pub const DEFAULT_VECTOR_FILENAME: &str = "notion_svg_export.png";

/// Marker class of injected trigger affordances
pub const TRIGGER_CLASS: &str = "notionImageExtractorTrigger";

/// Maximum size for image downloads (bytes)
///
/// Notion caps uploads on free workspaces at 5MB; paid plans allow far larger
/// files, but anything beyond this is almost certainly not an inline image.
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 50 * 1024 * 1024;

/// Maximum width or height accepted for a drawing surface (pixels)
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
