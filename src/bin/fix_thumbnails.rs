//! fix_thumbnails.rs
//! Idempotent repair pass for thumbnails whose URL ended up with a doubled
//! host segment after an earlier migration bug. URLs it cannot confidently
//! reconstruct are left untouched.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::cloud_name_from_env;
use portfolio_media::model;
use portfolio_media::reconcile::repair_doubled_url;
use portfolio_media::util::env as env_util;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fix_thumbnails", about = "Repair doubled thumbnail URLs")]
struct Cli {
    #[arg(long, default_value = model::PORTFOLIO_STORE)]
    store: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("fix_thumbnails");
    let cli = Cli::parse();

    if !cli.store.exists() {
        error!(path = %cli.store.display(), "metadata store not found; nothing to do");
        return Ok(());
    }

    let cloud_name = cloud_name_from_env();
    let mut items = model::load_items(&cli.store)?;
    let mut fixed = 0usize;

    for item in items.iter_mut() {
        let repaired = repair_doubled_url(&item.media.thumbnail, &cloud_name);
        if repaired != item.media.thumbnail {
            info!(
                id = item.id,
                old = %item.media.thumbnail,
                new = %repaired,
                "thumbnail repaired"
            );
            item.media.thumbnail = repaired;
            fixed += 1;
        }
    }

    model::save_items(&cli.store, &items)?;
    info!(fixed, items = items.len(), "thumbnail repair complete");
    Ok(())
}
