//! prepare_hosting.rs
//! Same ingestion as `ingest`, but media URLs honor the hosting toggle:
//! with USE_CLOUDINARY=true and CLOUDINARY_IMAGE_URL set the records point
//! at the CDN, otherwise they degrade to local relative paths.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::PathMode;
use portfolio_media::util::env as env_util;
use portfolio_media::{ingest, model, sheet};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "prepare_hosting",
    about = "Build portfolio_data.json with hosted or local media URLs"
)]
struct Cli {
    #[arg(long, default_value = "сайт_портфолио.xlsx")]
    excel: PathBuf,
    #[arg(long, default_value = "images")]
    images: PathBuf,
    #[arg(long, default_value = "icons")]
    icons: PathBuf,
    #[arg(long, default_value = model::PORTFOLIO_STORE)]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("prepare_hosting");
    let cli = Cli::parse();

    if !cli.excel.exists() {
        error!(path = %cli.excel.display(), "spreadsheet not found; nothing to do");
        return Ok(());
    }

    let mode = PathMode::from_env();
    match &mode {
        PathMode::Remote(urls) => info!(
            image_base = %urls.image_base,
            video_base = %urls.video_base,
            "remote hosting enabled"
        ),
        PathMode::Local => warn!(
            "using local paths; set USE_CLOUDINARY=true and CLOUDINARY_IMAGE_URL for hosted URLs"
        ),
    }

    let rows = sheet::read_headerless_rows(&cli.excel)?;
    let media = ingest::scan_media_dir(&cli.images)?;
    let thumbnails = ingest::scan_thumbnail_dir(&cli.icons)?;

    let items = ingest::build_items(&rows, &media, &thumbnails, &mode);
    model::save_items(&cli.out, &items)?;
    info!(items = items.len(), out = %cli.out.display(), "portfolio data written");
    Ok(())
}
