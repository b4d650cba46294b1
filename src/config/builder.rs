//! Type-safe builder for `ExtractorConfig` using the typestate pattern
//!
//! The output directory is the only required field; `build()` is not callable
//! until it is set.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_API_BASE_URL, DEFAULT_CACHE_VERSION, DEFAULT_MAX_IMAGE_SIZE,
};

// Type states for the builder
pub struct WithOutputDir;

pub struct ExtractorConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) api_base_url: String,
    pub(crate) session_token: Option<String>,
    pub(crate) cache_version: String,
    pub(crate) request_timeout_secs: u64,
    pub(crate) image_timeout_secs: u64,
    pub(crate) max_image_size: usize,
    pub(crate) require_auth_headers: bool,
    pub(crate) user_agent: String,
    pub(crate) headless: bool,
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ExtractorConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_token: None,
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            request_timeout_secs: 30,
            image_timeout_secs: 60,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            require_auth_headers: false,
            user_agent: CHROME_USER_AGENT.to_string(),
            headless: true,
            chrome_data_dir: None,
            _phantom: PhantomData,
        }
    }
}

impl ExtractorConfig {
    /// Create a builder for configuring an `ExtractorConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ExtractorConfigBuilder<()> {
        ExtractorConfigBuilder::default()
    }
}

impl ExtractorConfigBuilder<()> {
    pub fn output_dir(self, dir: impl Into<PathBuf>) -> ExtractorConfigBuilder<WithOutputDir> {
        ExtractorConfigBuilder {
            output_dir: Some(dir.into()),
            api_base_url: self.api_base_url,
            session_token: self.session_token,
            cache_version: self.cache_version,
            request_timeout_secs: self.request_timeout_secs,
            image_timeout_secs: self.image_timeout_secs,
            max_image_size: self.max_image_size,
            require_auth_headers: self.require_auth_headers,
            user_agent: self.user_agent,
            headless: self.headless,
            chrome_data_dir: self.chrome_data_dir,
            _phantom: PhantomData,
        }
    }
}

// Build method only available once the output directory is set
impl ExtractorConfigBuilder<WithOutputDir> {
    pub fn build(self) -> Result<ExtractorConfig> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| ExtractError::Config("output_dir is required".to_string()))?;

        let output_dir = if output_dir.is_absolute() {
            output_dir
        } else {
            std::env::current_dir()
                .map_err(|e| ExtractError::Config(format!("Cannot resolve output_dir: {e}")))?
                .join(output_dir)
        };

        let api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&api_base_url)
            .map_err(|e| ExtractError::Config(format!("Invalid api_base_url '{api_base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExtractError::Config(format!(
                "api_base_url must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        if self.cache_version.trim().is_empty() {
            return Err(ExtractError::Config("cache_version must not be empty".to_string()));
        }

        if self.max_image_size == 0 {
            return Err(ExtractError::Config("max_image_size must be positive".to_string()));
        }

        Ok(ExtractorConfig {
            output_dir,
            api_base_url,
            session_token: self.session_token.filter(|t| !t.trim().is_empty()),
            cache_version: self.cache_version,
            request_timeout_secs: self.request_timeout_secs,
            image_timeout_secs: self.image_timeout_secs,
            max_image_size: self.max_image_size,
            require_auth_headers: self.require_auth_headers,
            user_agent: self.user_agent,
            headless: self.headless,
            chrome_data_dir: self.chrome_data_dir,
        })
    }
}

// Builder methods available at any state
impl<State> ExtractorConfigBuilder<State> {
    /// Point the extractor at a different backend origin (e.g. a test server)
    ///
    /// # Example
    /// ```rust
    /// # use notion_image_extractor::config::ExtractorConfig;
    /// # fn main() -> Result<(), notion_image_extractor::ExtractError> {
    /// let config = ExtractorConfig::builder()
    ///     .api_base_url("http://127.0.0.1:8080")
    ///     .output_dir("/tmp/notion-images")
    ///     .build()?;
    /// assert_eq!(config.api_base_url(), "http://127.0.0.1:8080");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.image_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_image_size(mut self, bytes: usize) -> Self {
        self.max_image_size = bytes;
        self
    }

    /// Short-circuit hosted resolutions when space/user identifiers are missing
    ///
    /// By default the descriptor request is still sent without auth headers and
    /// left to fail on the backend.
    #[must_use]
    pub fn require_auth_headers(mut self, require: bool) -> Self {
        self.require_auth_headers = require;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chrome_data_dir = Some(dir.into());
        self
    }
}
