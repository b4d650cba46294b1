//! notion-image-extractor: download or copy images from a Notion page
//!
//! # Usage
//!
//! ```bash
//! # Save one hosted image or diagram by its block id
//! notion-image-extractor download --url https://www.notion.so/My-Page-0123 --block 4567
//!
//! # Save every code-block diagram on the page
//! notion-image-extractor download --url https://www.notion.so/My-Page-0123 --all-vectors
//!
//! # Copy an image, with URI/HTML text companions
//! notion-image-extractor copy --url https://www.notion.so/My-Page-0123 --block 4567 --with-text
//!
//! # Add download buttons to a saved page
//! notion-image-extractor annotate page.html --output page.annotated.html
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use notion_image_extractor::config::ExtractorConfig;
use notion_image_extractor::delivery::{
    BrowserClipboard, BrowserDownloads, DownloadSink, FileSystemDownloads,
};
use notion_image_extractor::utils::url_utils::display_name;
use notion_image_extractor::{
    ImageExtractor, ImageReference, LivePage, annotate_html, discover,
};

/// Download or copy images and diagrams from Notion pages
#[derive(Parser, Debug)]
#[command(name = "notion-image-extractor")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save images from a live page to disk
    Download {
        #[command(flatten)]
        session: SessionArgs,

        /// Block id of the image or diagram to save
        #[arg(short, long, conflicts_with = "all_vectors")]
        block: Option<String>,

        /// Save every code-block diagram on the page
        #[arg(long)]
        all_vectors: bool,

        /// Directory receiving the files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Let the browser save the files into its own download folder
        #[arg(long)]
        in_browser: bool,
    },

    /// Copy one image from a live page to the clipboard
    Copy {
        #[command(flatten)]
        session: SessionArgs,

        /// Block id of the image or diagram to copy
        #[arg(short, long)]
        block: String,

        /// Also place the image URI and an <img> snippet on the clipboard
        #[arg(long)]
        with_text: bool,
    },

    /// Insert download triggers into a saved page
    Annotate {
        /// Saved HTML page
        input: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Notion page URL
    #[arg(short, long)]
    url: String,

    /// Session token (token_v2 cookie); harvested from the browser if omitted
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Browser profile directory holding the Notion login
    #[arg(long)]
    profile_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Backend origin
    #[arg(long, default_value = notion_image_extractor::utils::DEFAULT_API_BASE_URL)]
    api_base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!(
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let cli = Cli::parse();
    match cli.command {
        Command::Download {
            session,
            block,
            all_vectors,
            output_dir,
            in_browser,
        } => run_download(session, block, all_vectors, output_dir, in_browser).await,
        Command::Copy {
            session,
            block,
            with_text,
        } => run_copy(session, block, with_text).await,
        Command::Annotate { input, output } => run_annotate(input, output).await,
    }
}

/// Open the page and wire an extractor onto it
async fn open_session(
    session: &SessionArgs,
    output_dir: PathBuf,
    in_browser: bool,
) -> Result<(LivePage, ImageExtractor, Vec<ImageReference>)> {
    let mut builder = ExtractorConfig::builder()
        .api_base_url(session.api_base_url.as_str())
        .headless(!session.headed)
        .output_dir(output_dir);
    if let Some(dir) = &session.profile_dir {
        builder = builder.chrome_data_dir(dir);
    }
    let config = builder.build()?;

    let live = LivePage::open(&config, &session.url).await?;
    match attach_extractor(&live, session, config, in_browser).await {
        Ok((extractor, references)) => Ok((live, extractor, references)),
        Err(e) => {
            if let Err(close_err) = live.close().await {
                warn!("Failed to close browser after setup error: {close_err:#}");
            }
            Err(e)
        }
    }
}

async fn attach_extractor(
    live: &LivePage,
    session: &SessionArgs,
    config: ExtractorConfig,
    in_browser: bool,
) -> Result<(ImageExtractor, Vec<ImageReference>)> {
    let token = match &session.token {
        Some(token) => Some(token.clone()),
        None => live.session_token().await?,
    };
    let config = config.with_session_token(token);

    let downloads: Arc<dyn DownloadSink> = if in_browser {
        Arc::new(BrowserDownloads::new(live.page().clone()))
    } else {
        Arc::new(FileSystemDownloads::new(config.output_dir().clone()))
    };
    let clipboard = Arc::new(BrowserClipboard::new(live.page().clone()));
    let extractor = ImageExtractor::new(config, live.context(), downloads, clipboard)?;

    let snapshot = live.refresh().await?;
    let references = discover(&snapshot);
    info!("Found {} image target(s)", references.len());

    Ok((extractor, references))
}

fn find_target<'a>(references: &'a [ImageReference], block: &str) -> Result<&'a ImageReference> {
    references
        .iter()
        .find(|reference| reference.parent_block_id() == Some(block))
        .with_context(|| format!("No image or diagram found in block {block}"))
}

async fn run_download(
    session: SessionArgs,
    block: Option<String>,
    all_vectors: bool,
    output_dir: PathBuf,
    in_browser: bool,
) -> Result<()> {
    if block.is_none() && !all_vectors {
        anyhow::bail!("Pass --block <id> or --all-vectors");
    }

    let (live, extractor, references) = open_session(&session, output_dir, in_browser).await?;

    let outcome = async {
        if let Some(block) = block {
            let target = find_target(&references, &block)?;
            let path = extractor.download_image(target).await?;
            println!("{}", path.display());
            return Ok::<(), anyhow::Error>(());
        }

        let results = extractor.download_all_vector_graphics(&references).await;
        let mut failed = 0;
        for result in results {
            match result {
                Ok(path) => println!("{}", display_name(&path)),
                Err(e) => {
                    failed += 1;
                    warn!("{e}");
                }
            }
        }
        if failed > 0 {
            anyhow::bail!("{failed} diagram download(s) failed");
        }
        Ok(())
    }
    .await;

    live.close().await?;
    outcome
}

async fn run_copy(session: SessionArgs, block: String, with_text: bool) -> Result<()> {
    let (live, extractor, references) = open_session(&session, PathBuf::from("."), false).await?;

    let outcome = async {
        let target = find_target(&references, &block)?;
        let payload = extractor.copy_image(target, with_text).await?;
        let formats: Vec<&str> = payload.mime_types().collect();
        println!("Copied {}", formats.join(", "));
        Ok::<(), anyhow::Error>(())
    }
    .await;

    live.close().await?;
    outcome
}

async fn run_annotate(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let html = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let (annotated, installed) = annotate_html(&html)?;

    let output = output.unwrap_or(input);
    tokio::fs::write(&output, annotated)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Installed {installed} trigger(s) into {}", output.display());
    Ok(())
}
