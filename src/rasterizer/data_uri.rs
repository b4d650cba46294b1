//! `data:` URI encoding and decoding

use base64::Engine;

use crate::error::{ExtractError, Result};

/// Payload of a decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type without parameters; `None` when the URI omits it
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Encode bytes as a base64 `data:` URI
#[must_use]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded_capacity = base64::encoded_len(bytes.len(), true).unwrap_or(0);
    let mut encoded = String::with_capacity(encoded_capacity + 14 + mime.len());

    encoded.push_str("data:");
    encoded.push_str(mime);
    encoded.push_str(";base64,");

    base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut encoded);
    encoded
}

/// Decode a `data:` URI, base64 or percent-encoded
pub fn decode_data_uri(uri: &str) -> Result<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ExtractError::Rasterization("Not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExtractError::Rasterization("Malformed data URI: missing ','".to_string()))?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ExtractError::Rasterization(format!("Invalid base64 in data URI: {e}")))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok(DataUri { mime, bytes })
}
