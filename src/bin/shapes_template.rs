//! shapes_template.rs
//! Write editable per-shape template CSVs with example geometry. Values are
//! stored at export scale (1/10th for sphere/star/text) so running
//! shapes_csv over the untouched templates reproduces the example shapes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use portfolio_media::shapes::{csv_scale, template_set, Coordinate};
use portfolio_media::util::env as env_util;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "shapes_template",
    about = "Generate editable shape coordinate templates"
)]
struct Cli {
    /// Where to write the template CSVs
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("shapes_template");
    let cli = Cli::parse();

    let set = template_set();
    write_template(&cli.out_dir.join("star.csv"), &set.star, "star", false)?;
    write_template(&cli.out_dir.join("sphere.csv"), &set.sphere, "sphere", true)?;
    write_template(&cli.out_dir.join("pattern.csv"), &set.pattern, "pattern", false)?;
    write_template(&cli.out_dir.join("art.csv"), &set.text, "text", false)?;

    info!(dir = %cli.out_dir.display(), "templates written");
    info!("edit the coordinates, then run shapes_csv to rebuild shapes_coordinates.json");
    Ok(())
}

fn write_template(path: &Path, coordinates: &[Coordinate], shape: &str, with_z: bool) -> Result<()> {
    let scale = csv_scale(shape);
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if with_z {
        writer.write_record(["index", "x", "y", "z"])?;
    } else {
        writer.write_record(["index", "x", "y"])?;
    }
    for c in coordinates {
        let index = c.index.to_string();
        let x = (c.x / scale).to_string();
        let y = (c.y / scale).to_string();
        if with_z {
            writer.write_record([index, x, y, c.z.unwrap_or(0.5).to_string()])?;
        } else {
            writer.write_record([index, x, y])?;
        }
    }
    writer.flush()?;
    info!(file = %path.display(), rows = coordinates.len(), "template written");
    Ok(())
}
