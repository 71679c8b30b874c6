//! sync_remote_names.rs
//! Reconcile portfolio_data.json with the names the remote store actually
//! assigned. Lists every folder once, builds a number -> public id map
//! (collision-renamed entries win), then rewrites path/thumbnail URLs that
//! differ. Rate-limited listings keep their partial results; rerun later to
//! pick up the remainder.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::{DeliveryUrls, RemoteCredentials};
use portfolio_media::reconcile::{apply_map, RemoteIdentifierMap, FOLDERS};
use portfolio_media::remote::{RemoteStore, ResourceKind};
use portfolio_media::util::env as env_util;
use portfolio_media::model;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sync_remote_names",
    about = "Rewrite portfolio URLs from the remote store's listing"
)]
struct Cli {
    /// Metadata store to update in place
    #[arg(long, default_value = model::PORTFOLIO_STORE)]
    store: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::bootstrap_cli("sync_remote_names");
    let cli = Cli::parse();

    if !cli.store.exists() {
        error!(path = %cli.store.display(), "metadata store not found; nothing to do");
        return Ok(());
    }

    let creds = RemoteCredentials::from_env()?;
    let urls = DeliveryUrls::from_env();
    let remote = RemoteStore::new(creds);

    let mut map = RemoteIdentifierMap::new();
    for folder in FOLDERS {
        for kind in ResourceKind::ALL {
            let listing = remote.list_all(&format!("{folder}/"), kind).await;
            info!(
                folder,
                kind = kind.as_str(),
                found = listing.entries.len(),
                "remote listing loaded"
            );
            if listing.truncated {
                warn!(
                    folder,
                    kind = kind.as_str(),
                    mapped_so_far = map.folder_len(folder),
                    "listing truncated; continuing with partial map"
                );
            }
            for entry in &listing.entries {
                map.insert(folder, &entry.public_id);
            }
        }
    }
    info!(total_mapped = map.len(), "identifier map built");

    let mut items = model::load_items(&cli.store)?;
    let summary = apply_map(&mut items, &map, &urls);
    model::save_items(&cli.store, &items)?;

    info!(
        updated = summary.updated,
        not_found = summary.not_found,
        items = items.len(),
        "sync complete"
    );
    Ok(())
}
