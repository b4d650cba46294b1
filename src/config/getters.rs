//! Getter methods for `ExtractorConfig`

use std::path::PathBuf;
use std::time::Duration;

use super::types::ExtractorConfig;

impl ExtractorConfig {
    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    #[must_use]
    pub fn cache_version(&self) -> &str {
        &self.cache_version
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    #[must_use]
    pub fn max_image_size(&self) -> usize {
        self.max_image_size
    }

    #[must_use]
    pub fn require_auth_headers(&self) -> bool {
        self.require_auth_headers
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }

    /// Replace the session token, e.g. with one harvested from a live browser
    #[must_use]
    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Full URL of the signed-download descriptor endpoint
    #[must_use]
    pub fn block_file_download_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base_url,
            crate::utils::BLOCK_FILE_DOWNLOAD_PATH
        )
    }
}
