//! fix_remote_paths.rs
//! Deterministically rewrite every record's path/thumbnail from its local
//! file name: `<base>/images/<stem>` for the asset and `<base>/icons/<n>`
//! for the thumbnail. Use after a reupload that restored the original
//! public ids (delivery URLs carry no file extension).

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::DeliveryUrls;
use portfolio_media::model::{self, MediaType};
use portfolio_media::util::env as env_util;
use portfolio_media::ingest::extract_number;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "fix_remote_paths",
    about = "Rewrite portfolio URLs from original file names"
)]
struct Cli {
    #[arg(long, default_value = model::PORTFOLIO_STORE)]
    store: PathBuf,
}

fn main() -> Result<()> {
    env_util::bootstrap_cli("fix_remote_paths");
    let cli = Cli::parse();

    if !cli.store.exists() {
        error!(path = %cli.store.display(), "metadata store not found; nothing to do");
        return Ok(());
    }

    let urls = DeliveryUrls::from_env();
    let mut items = model::load_items(&cli.store)?;
    let mut updated = 0usize;

    for item in items.iter_mut() {
        let media = &mut item.media;
        if media.filename.is_empty() {
            continue;
        }

        let new_path = asset_url(&urls, &media.filename, media.kind);
        if media.path != new_path {
            media.path = new_path;
            updated += 1;
        }

        if let Some(new_thumbnail) = thumbnail_url(&urls, &media.filename, &media.thumbnail) {
            if media.thumbnail != new_thumbnail {
                media.thumbnail = new_thumbnail;
                updated += 1;
            }
        }
    }

    model::save_items(&cli.store, &items)?;
    info!(updated, items = items.len(), "paths rewritten");
    info!("delivery URLs use the public id (file name without extension), e.g. 250.png -> .../images/250");
    Ok(())
}

fn stem_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

fn asset_url(urls: &DeliveryUrls, filename: &str, kind: MediaType) -> String {
    let base = match kind {
        MediaType::Video => &urls.video_base,
        MediaType::Image => &urls.image_base,
    };
    format!("{base}images/{}", stem_of(filename))
}

/// Thumbnail URL from the asset's embedded number; when the file name has no
/// number, fall back to salvaging a numeric segment out of an existing
/// hosted URL that lacks the icons/ folder.
fn thumbnail_url(urls: &DeliveryUrls, filename: &str, current: &str) -> Option<String> {
    if let Some(number) = extract_number(filename) {
        return Some(format!("{}icons/{number}", urls.image_base));
    }
    if current.starts_with("http")
        && !current.contains("/icons/")
        && current.contains("/image/upload/")
    {
        let number = current
            .split('/')
            .find(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))?;
        return Some(format!("{}icons/{number}", urls.image_base));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> DeliveryUrls {
        DeliveryUrls {
            image_base: "https://res.cloudinary.com/test/image/upload/".into(),
            video_base: "https://res.cloudinary.com/test/video/upload/".into(),
        }
    }

    #[test]
    fn asset_url_drops_the_extension() {
        assert_eq!(
            asset_url(&urls(), "250.png", MediaType::Image),
            "https://res.cloudinary.com/test/image/upload/images/250"
        );
        assert_eq!(
            asset_url(&urls(), "7.mp4", MediaType::Video),
            "https://res.cloudinary.com/test/video/upload/images/7"
        );
    }

    #[test]
    fn thumbnail_url_uses_the_embedded_number() {
        assert_eq!(
            thumbnail_url(&urls(), "scan_42_final.png", "icons/42.png"),
            Some("https://res.cloudinary.com/test/image/upload/icons/42".into())
        );
    }

    #[test]
    fn numberless_files_salvage_from_hosted_url() {
        let current = "https://res.cloudinary.com/test/image/upload/88";
        assert_eq!(
            thumbnail_url(&urls(), "cover.png", current),
            Some("https://res.cloudinary.com/test/image/upload/icons/88".into())
        );
        // already under icons/: left alone
        let ok = "https://res.cloudinary.com/test/image/upload/icons/88";
        assert_eq!(thumbnail_url(&urls(), "cover.png", ok), None);
        // local path: nothing to salvage
        assert_eq!(thumbnail_url(&urls(), "cover.png", "icons/88.png"), None);
    }
}
