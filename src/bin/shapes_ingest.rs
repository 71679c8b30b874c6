//! shapes_ingest.rs
//! Convert the shape-coordinate workbook (one sheet per shape, columns
//! index/x/y and optional z) into shapes_coordinates.json.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::shapes;
use portfolio_media::util::env as env_util;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "shapes_ingest",
    about = "Build shapes_coordinates.json from the coordinate workbook"
)]
struct Cli {
    #[arg(long, default_value = "shapes_coordinates.xlsx")]
    excel: PathBuf,
    #[arg(long, default_value = shapes::SHAPES_STORE)]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("shapes_ingest");
    let cli = Cli::parse();

    if !cli.excel.exists() {
        error!(path = %cli.excel.display(), "workbook not found; nothing to do");
        error!("expected sheets star/sphere/pattern/text with columns index, x, y (optional z)");
        return Ok(());
    }

    let set = shapes::from_workbook(&cli.excel)?;
    set.save(&cli.out)?;

    for (name, coordinates) in set.shapes() {
        if !coordinates.is_empty() {
            info!(shape = name, count = coordinates.len(), "coordinates loaded");
        }
    }
    info!(total = set.total(), out = %cli.out.display(), "shape coordinates written");
    Ok(())
}
