//! shapes_csv.rs
//! Convert per-shape CSV coordinate exports (sphere.csv, star.csv, art.csv,
//! pattern1.csv/pattern.csv) into shapes_coordinates.json. Handles the
//! exporters' flexible column naming and rescales the sphere's depth to
//! the 0..1 range the site expects.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::shapes;
use portfolio_media::util::env as env_util;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "shapes_csv",
    about = "Build shapes_coordinates.json from per-shape CSV exports"
)]
struct Cli {
    /// Directory holding the CSV exports
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    #[arg(long, default_value = shapes::SHAPES_STORE)]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("shapes_csv");
    let cli = Cli::parse();

    let set = shapes::from_csv_dir(&cli.dir)?;
    set.save(&cli.out)?;

    for (name, coordinates) in set.shapes() {
        if coordinates.is_empty() {
            continue;
        }
        if name == "sphere" {
            let depths: Vec<f64> = coordinates.iter().filter_map(|c| c.z).collect();
            let min = depths.iter().copied().reduce(f64::min).unwrap_or(0.0);
            let max = depths.iter().copied().reduce(f64::max).unwrap_or(0.0);
            info!(
                shape = name,
                count = coordinates.len(),
                z_min = min,
                z_max = max,
                "coordinates loaded"
            );
        } else {
            info!(shape = name, count = coordinates.len(), "coordinates loaded");
        }
    }
    info!(total = set.total(), out = %cli.out.display(), "shape coordinates written");
    Ok(())
}
