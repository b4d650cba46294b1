//! Resolved source types

use crate::utils::DEFAULT_IMAGE_MIME;

/// A concrete, deliverable image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Authenticated backend URL (hosted) or PNG data URI (vector)
    pub uri: String,
    pub mime: String,
    /// Always the part of `mime` after the first `/`
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ResolvedSource {
    /// Build a source, deriving `mime` and `extension` from a raw content type
    #[must_use]
    pub fn new(uri: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime = normalize_mime(content_type);
        let extension = extension_for(&mime);
        Self {
            uri: uri.into(),
            mime,
            extension,
            bytes,
        }
    }

    #[must_use]
    pub fn is_png(&self) -> bool {
        self.mime == crate::utils::PNG_MIME
    }
}

/// Lowercased essence of a content type, `image/jpeg` when absent or blank
#[must_use]
pub fn normalize_mime(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .filter(|essence| !essence.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
}

/// File extension for a MIME type: the substring after the first `/`
#[must_use]
pub fn extension_for(mime: &str) -> String {
    match mime.split_once('/') {
        Some((_, subtype)) => subtype.to_string(),
        None => mime.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_mime() {
        let source = ResolvedSource::new("u", Some("image/jpeg"), Vec::new());
        assert_eq!(source.extension, "jpeg");

        let source = ResolvedSource::new("u", Some("Image/PNG; charset=binary"), Vec::new());
        assert_eq!(source.mime, "image/png");
        assert_eq!(source.extension, "png");
        assert!(source.is_png());
    }

    #[test]
    fn missing_content_type_defaults_to_jpeg() {
        let source = ResolvedSource::new("u", None, Vec::new());
        assert_eq!(source.mime, "image/jpeg");
        assert_eq!(source.extension, "jpeg");

        assert_eq!(normalize_mime(Some("  ")), "image/jpeg");
    }
}
