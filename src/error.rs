//! Error types for the extraction pipeline
//!
//! Every invocation (download or copy) either completes or fails with exactly one of
//! these variants. Nothing is retried.

/// Errors produced while resolving, rasterizing or delivering an image
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Page identity could not be derived from the document
    #[error("Page context unavailable: {0}")]
    Context(String),

    /// Backend call failed or a required identifier was missing
    #[error("Failed to resolve image source: {0}")]
    Resolution(String),

    /// Drawing surface could not be created or the source could not be decoded
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// The platform clipboard rejected the write
    #[error("Clipboard write rejected: {0}")]
    Clipboard(String),

    /// Element kind not handled by the resolver
    #[error("Unsupported element <{tag}>")]
    UnsupportedElement { tag: String },

    /// Download could not be written or triggered
    #[error("Download failed: {0}")]
    Delivery(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    /// Short stable label for log lines
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Context(_) => "context",
            Self::Resolution(_) => "resolution",
            Self::Rasterization(_) => "rasterization",
            Self::Clipboard(_) => "clipboard",
            Self::UnsupportedElement { .. } => "unsupported_element",
            Self::Delivery(_) => "delivery",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
