//! upload_media.rs
//! Upload the local media folders to the remote store, one file at a time.
//! Each file is stored under `<folder>/<stem>` so delivery URLs keep the
//! original numeric names; existing copies are overwritten and invalidated.
//! Per-file failures are counted and skipped, never fatal to the batch.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use portfolio_media::config::RemoteCredentials;
use portfolio_media::reconcile::FOLDERS;
use portfolio_media::remote::{RemoteStore, ResourceKind};
use portfolio_media::util::env as env_util;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct UploadSummary {
    uploaded: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::bootstrap_cli("upload_media");

    let creds = RemoteCredentials::from_env()?;
    info!(cloud = %creds.cloud_name, "starting upload");
    let store = RemoteStore::new(creds);

    let mut totals = UploadSummary::default();
    for folder in FOLDERS {
        let summary = upload_folder(&store, Path::new(folder), folder).await?;
        totals.uploaded += summary.uploaded;
        totals.failed += summary.failed;
    }

    info!(
        uploaded = totals.uploaded,
        failed = totals.failed,
        "upload complete"
    );
    if totals.failed == 0 {
        info!("next step: run sync_remote_names to update portfolio_data.json");
    }
    Ok(())
}

async fn upload_folder(
    store: &RemoteStore,
    dir: &Path,
    remote_folder: &str,
) -> Result<UploadSummary> {
    let mut summary = UploadSummary::default();
    if !dir.exists() {
        warn!(dir = %dir.display(), "folder not found, skipping");
        return Ok(summary);
    }

    info!(dir = %dir.display(), "uploading folder");
    for path in walk_files(dir)? {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let public_id = format!("{remote_folder}/{stem}");
        let kind = ResourceKind::for_path(&path);
        match store.upload(&path, &public_id, kind).await {
            Ok(stored) => {
                info!(public_id = %stored, file = %path.display(), "uploaded");
                summary.uploaded += 1;
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "upload failed");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// All regular files under a directory, recursively, in listing order.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    Ok(files)
}
