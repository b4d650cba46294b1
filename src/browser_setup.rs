//! Chrome discovery and launch for the live Notion session

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

/// Environment variable overriding browser discovery
pub const BROWSER_PATH_ENV: &str = "CHROMIUM_PATH";

const PROFILE_DIR_NAME: &str = "notion_image_extractor";

#[cfg(target_os = "windows")]
const CANDIDATE_PATHS: &[&str] = &[
    r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
    r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
    r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
    r"%PROGRAMFILES%\Chromium\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const CANDIDATE_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/opt/homebrew/bin/chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATE_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

/// Locate an installed Chrome or Chromium
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(BROWSER_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {BROWSER_PATH_ENV}: {}", path.display());
            return Ok(path);
        }
        warn!(
            "{BROWSER_PATH_ENV} points to a missing file: {}",
            path.display()
        );
    }

    if let Some(path) = CANDIDATE_PATHS
        .iter()
        .filter_map(|candidate| expand_candidate(candidate))
        .find(|path| path.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for name in ["google-chrome", "chromium", "chromium-browser", "chrome"] {
            if let Ok(output) = Command::new("which").arg(name).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser on PATH: {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

fn expand_candidate(candidate: &str) -> Option<PathBuf> {
    if let Some(rest) = candidate.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    if candidate.contains('%') {
        return Some(PathBuf::from(expand_windows_env_vars(candidate)));
    }
    Some(PathBuf::from(candidate))
}

/// Replace `%VAR%` tokens with environment values
///
/// Unknown variables and unterminated tokens are kept verbatim; `%%` collapses
/// to a single `%`.
pub(crate) fn expand_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(0) => {
                result.push('%');
                rest = &after[1..];
            }
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push('%');
                result.push_str(after);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}

/// Fetch a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "No user cache directory, using temp directory: {}",
                fallback.display()
            );
            fallback
        })
        .join(PROFILE_DIR_NAME)
        .join("chromium");

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Default persistent profile, so a Notion login survives restarts
#[must_use]
pub fn default_profile_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(PROFILE_DIR_NAME)
        .join("profile")
}

/// Launch Chrome with the given profile directory
///
/// Returns the browser, the CDP handler task, and the profile path in use.
/// The handler task must be kept alive for as long as the browser is.
pub async fn launch_browser(
    headless: bool,
    profile_dir: Option<PathBuf>,
    user_agent: &str,
) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}; falling back to a managed download");
            download_managed_browser().await?
        }
    };

    let profile_dir = profile_dir.unwrap_or_else(default_profile_dir);
    tokio::fs::create_dir_all(&profile_dir)
        .await
        .context("Failed to create browser profile directory")?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1440, 900)
        .user_data_dir(profile_dir.clone())
        .chrome_executable(chrome_path);

    builder = if headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    builder = builder
        .arg(format!("--user-agent={user_agent}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain");

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser with profile {}", profile_dir.display());
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode every CDP event; those are noise
                if message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed CDP decode error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task, profile_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unknown_and_unterminated_tokens() {
        assert_eq!(
            expand_windows_env_vars(r"%NIE_SURELY_UNSET_VAR%\chrome.exe"),
            r"%NIE_SURELY_UNSET_VAR%\chrome.exe"
        );
        assert_eq!(expand_windows_env_vars("100%% sure"), "100% sure");
        assert_eq!(expand_windows_env_vars("tail %open"), "tail %open");
        assert_eq!(expand_windows_env_vars("plain"), "plain");
    }

    #[test]
    fn expands_known_variable() {
        let Ok(home) = std::env::var("PATH") else {
            return;
        };
        assert_eq!(expand_windows_env_vars("%PATH%/x"), format!("{home}/x"));
    }
}
