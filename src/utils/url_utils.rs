//! URL and file name helpers.

use std::path::Path;

/// Last non-empty `/`-separated segment of a URI, ignoring any query string
#[must_use]
pub fn tail_segment(uri: &str) -> Option<&str> {
    let without_query = if uri.starts_with("data:") {
        uri
    } else {
        uri.split(['?', '#']).next().unwrap_or(uri)
    };
    without_query.rsplit('/').find(|segment| !segment.is_empty())
}

/// Pick a download file name: suggestion, then URI tail, then the URI itself
///
/// The result is always sanitized for the local filesystem.
#[must_use]
pub fn download_file_name(uri: &str, suggested: Option<&str>) -> String {
    let raw = suggested
        .filter(|name| !name.trim().is_empty())
        .or_else(|| tail_segment(uri))
        .unwrap_or(uri);

    let sanitized = sanitize_filename::sanitize(raw);
    if sanitized.is_empty() {
        crate::utils::constants::DEFAULT_VECTOR_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Check if a URL is an http(s) URL the rasterizer may fetch
#[must_use]
pub fn is_fetchable_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// File name portion of a path for log lines
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
