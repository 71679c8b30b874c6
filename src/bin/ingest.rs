//! ingest.rs
//! Build portfolio_data.json from the headerless portfolio workbook plus the
//! local images/ and icons/ folders. Paths stay local and relative; use
//! prepare_hosting for CDN URLs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::PathMode;
use portfolio_media::util::env as env_util;
use portfolio_media::{ingest, model, sheet};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "ingest",
    about = "Build portfolio_data.json from the spreadsheet and local media"
)]
struct Cli {
    /// Source workbook; headerless, data row 1 pairs with media file "1.*"
    #[arg(long, default_value = "сайт_портфолио.xlsx")]
    excel: PathBuf,
    /// Folder of full-resolution assets
    #[arg(long, default_value = "images")]
    images: PathBuf,
    /// Folder of thumbnails
    #[arg(long, default_value = "icons")]
    icons: PathBuf,
    /// Output metadata store
    #[arg(long, default_value = model::PORTFOLIO_STORE)]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("ingest");
    let cli = Cli::parse();

    if !cli.excel.exists() {
        error!(path = %cli.excel.display(), "spreadsheet not found; nothing to do");
        return Ok(());
    }

    let rows = sheet::read_headerless_rows(&cli.excel)?;
    info!(rows = rows.len(), "spreadsheet loaded");

    let media = ingest::scan_media_dir(&cli.images)?;
    let thumbnails = ingest::scan_thumbnail_dir(&cli.icons)?;
    info!(
        media = media.len(),
        thumbnails = thumbnails.len(),
        "local folders scanned"
    );

    let items = ingest::build_items(&rows, &media, &thumbnails, &PathMode::Local);
    model::save_items(&cli.out, &items)?;
    info!(items = items.len(), out = %cli.out.display(), "portfolio data written");
    Ok(())
}
