//! Download sinks

use chromiumoxide::Page;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncWriteExt;

use super::js_scripts::anchor_download_script;
use crate::error::{ExtractError, Result};
use crate::resolver::ResolvedSource;

const MAX_NAME_SUFFIX: u32 = 10_000;

/// Boxed future returned by delivery traits
pub type DeliveryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Destination for downloaded images
pub trait DownloadSink: Send + Sync {
    /// Save `source` under `file_name`, returning where it went
    fn save<'a>(&'a self, file_name: &'a str, source: &'a ResolvedSource)
    -> DeliveryFuture<'a, PathBuf>;
}

/// Writes downloads into a local directory
///
/// Existing files are never overwritten; a ` (n)` suffix is added instead,
/// the way browsers name repeated downloads.
#[derive(Debug, Clone)]
pub struct FileSystemDownloads {
    dir: PathBuf,
}

impl FileSystemDownloads {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileSystemDownloads {
    fn save<'a>(
        &'a self,
        file_name: &'a str,
        source: &'a ResolvedSource,
    ) -> DeliveryFuture<'a, PathBuf> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
                ExtractError::Delivery(format!(
                    "Failed to create download directory {}: {e}",
                    self.dir.display()
                ))
            })?;

            let path = create_unique(&self.dir, file_name, &source.bytes).await?;
            Ok(path)
        })
    }
}

/// Candidate names for `file_name`: itself, then ` (1)`, ` (2)`, ...
fn candidate_names(file_name: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    std::iter::once(file_name.to_string()).chain((1..MAX_NAME_SUFFIX).map(move |n| match ext {
        Some(ext) => format!("{stem} ({n}).{ext}"),
        None => format!("{stem} ({n})"),
    }))
}

/// Write `bytes` to the first free candidate path inside `dir`
///
/// The file is created with `create_new`, so concurrent saves under the same
/// name each claim a distinct path.
async fn create_unique(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    for name in candidate_names(file_name) {
        let path = dir.join(name);
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ExtractError::Delivery(format!(
                    "Failed to create {}: {e}",
                    path.display()
                )));
            }
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            // Don't leave a truncated file claiming the name
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ExtractError::Delivery(format!(
                "Failed to write {}: {e}",
                path.display()
            )));
        }
        return Ok(path);
    }

    Err(ExtractError::Delivery(format!(
        "No free file name for {file_name} in {}",
        dir.display()
    )))
}

/// Triggers downloads inside the live page
///
/// The browser picks the destination directory; the returned path is the
/// file name only.
#[derive(Clone)]
pub struct BrowserDownloads {
    page: Page,
}

impl BrowserDownloads {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

impl DownloadSink for BrowserDownloads {
    fn save<'a>(
        &'a self,
        file_name: &'a str,
        source: &'a ResolvedSource,
    ) -> DeliveryFuture<'a, PathBuf> {
        Box::pin(async move {
            self.page
                .evaluate(anchor_download_script(&source.uri, file_name).as_str())
                .await
                .map_err(|e| ExtractError::Delivery(format!("Anchor download failed: {e}")))?;
            Ok(PathBuf::from(file_name))
        })
    }
}
