//! Identifier reconciliation: matching local file names, remote public ids
//! and thumbnail names through the numeric id embedded in each.
//!
//! The remote store renames on collision (`26.png` may be stored as
//! `images/26_egl2kh`), so after a migration the metadata URLs have to be
//! re-derived from an authoritative listing rather than from local names.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::DeliveryUrls;
use crate::model::{MediaType, PortfolioItem};

/// Logical folders the migration uses on the remote store.
pub const FOLDERS: [&str; 3] = ["images", "icons", "alisa"];

/// Host marker used to detect accidentally doubled URLs.
pub const HOST_MARKER: &str = "cloudinary.com";

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)").expect("static regex"))
}

fn suffixed_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)[_-]").expect("static regex"))
}

fn bare_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:\.|$)").expect("static regex"))
}

/// Leading run of digits in a local file name, kept as text so the key
/// matches the remote map exactly (leading zeros preserved).
pub fn leading_number(name: &str) -> Option<&str> {
    leading_number_re()
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Number extracted from a remote entry's bare file name. Tries the
/// collision-renamed form `<number>_<suffix>` / `<number>-<suffix>` first,
/// then a bare numeric name.
pub fn remote_entry_number(file_name: &str) -> Option<&str> {
    suffixed_name_re()
        .captures(file_name)
        .or_else(|| bare_name_re().captures(file_name))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn has_separator_suffix(file_name: &str) -> bool {
    suffixed_name_re().is_match(file_name)
}

fn file_name_of(public_id: &str) -> &str {
    public_id.rsplit('/').next().unwrap_or(public_id)
}

/// Map from (folder, numeric id) to the remote store's canonical public id.
#[derive(Debug, Default, Clone)]
pub struct RemoteIdentifierMap {
    folders: HashMap<String, HashMap<String, String>>,
}

impl RemoteIdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one remote entry. When two entries share a number, the
    /// separator-suffix form wins over a bare numeric name: the renamed copy
    /// is assumed to be the store's authoritative one.
    pub fn insert(&mut self, folder: &str, public_id: &str) {
        let file_name = file_name_of(public_id);
        let Some(number) = remote_entry_number(file_name) else {
            debug!(folder, public_id, "remote entry has no leading number; ignored");
            return;
        };
        let entries = self.folders.entry(folder.to_string()).or_default();
        let replace = match entries.get(number) {
            None => true,
            Some(current) => {
                has_separator_suffix(file_name) && !has_separator_suffix(file_name_of(current))
            }
        };
        if replace {
            entries.insert(number.to_string(), public_id.to_string());
        }
    }

    pub fn get(&self, folder: &str, number: &str) -> Option<&str> {
        self.folders
            .get(folder)
            .and_then(|entries| entries.get(number))
            .map(String::as_str)
    }

    /// Total entries across all folders.
    pub fn len(&self) -> usize {
        self.folders.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn folder_len(&self, folder: &str) -> usize {
        self.folders.get(folder).map_or(0, HashMap::len)
    }
}

/// Outcome counts of one reconciliation pass, for operator review.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Fields rewritten because the recomputed URL differed.
    pub updated: usize,
    /// Records with no usable number or no entry in the map.
    pub not_found: usize,
}

/// Rewrite `path`/`thumbnail` for every record whose number resolves through
/// the map. Only byte-for-byte differences count as updates, so a second run
/// over the same map is a no-op.
pub fn apply_map(
    items: &mut [PortfolioItem],
    map: &RemoteIdentifierMap,
    urls: &DeliveryUrls,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for item in items.iter_mut() {
        let media = &mut item.media;
        let Some(number) = leading_number(&media.filename).map(str::to_string) else {
            summary.not_found += 1;
            debug!(filename = %media.filename, "no leading number; record left untouched");
            continue;
        };

        // Full assets live under images/ regardless of type; only the
        // delivery base URL differs for videos.
        match map.get("images", &number) {
            Some(public_id) => {
                let base = match media.kind {
                    MediaType::Video => &urls.video_base,
                    MediaType::Image => &urls.image_base,
                };
                let new_path = format!("{base}{public_id}");
                if media.path != new_path {
                    info!(filename = %media.filename, new_path = %new_path, "updating path");
                    media.path = new_path;
                    summary.updated += 1;
                }
            }
            None => {
                summary.not_found += 1;
                debug!(filename = %media.filename, number = %number, "no remote entry");
            }
        }

        if let Some(public_id) = map.get("icons", &number) {
            let new_thumbnail = format!("{}{public_id}", urls.image_base);
            if media.thumbnail != new_thumbnail {
                info!(filename = %media.filename, new_thumbnail = %new_thumbnail, "updating thumbnail");
                media.thumbnail = new_thumbnail;
                summary.updated += 1;
            }
        }
    }

    summary
}

/// Repair a URL whose host segment got accidentally doubled by an earlier
/// migration bug. Reconstructs from the content after the last marker
/// occurrence; when no known folder can be located there, returns the input
/// unchanged rather than guessing. Idempotent on well-formed URLs.
pub fn repair_doubled_url(url: &str, cloud_name: &str) -> String {
    if !url.starts_with("http") {
        return url.to_string();
    }
    if url.matches(HOST_MARKER).count() <= 1 {
        return url.to_string();
    }

    let last_part = url.rsplit(HOST_MARKER).next().unwrap_or("");

    if last_part.contains("/image/upload/") {
        let tail = last_part.rsplit("/image/upload").next().unwrap_or("");
        return format!("https://res.cloudinary.com/{cloud_name}/image/upload{tail}");
    }
    if last_part.contains("/video/upload/") {
        let tail = last_part.rsplit("/video/upload").next().unwrap_or("");
        return format!("https://res.cloudinary.com/{cloud_name}/video/upload{tail}");
    }

    let segments: Vec<&str> = last_part.split('/').collect();
    let Some(folder_idx) = segments.iter().position(|s| FOLDERS.contains(s)) else {
        // Nothing recognizable; refuse to guess.
        return url.to_string();
    };
    let folder = segments[folder_idx];
    let file_id = segments.get(folder_idx + 1).copied().unwrap_or("");
    let resource_type = if folder == "alisa" || file_id.contains(".mp4") || file_id.contains(".mov")
    {
        "video"
    } else {
        "image"
    };
    format!("https://res.cloudinary.com/{cloud_name}/{resource_type}/upload/{folder}/{file_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Media;
    use indexmap::IndexMap;

    fn item(filename: &str, kind: MediaType, path: &str, thumbnail: &str) -> PortfolioItem {
        PortfolioItem {
            id: 1,
            media: Media {
                filename: filename.into(),
                kind,
                path: path.into(),
                thumbnail: thumbnail.into(),
            },
            title: String::new(),
            description: String::new(),
            additional: IndexMap::new(),
        }
    }

    fn urls() -> DeliveryUrls {
        DeliveryUrls {
            image_base: "https://res.cloudinary.com/test/image/upload/".into(),
            video_base: "https://res.cloudinary.com/test/video/upload/".into(),
        }
    }

    #[test]
    fn all_naming_schemes_map_to_the_same_number() {
        assert_eq!(remote_entry_number("250.png"), Some("250"));
        assert_eq!(remote_entry_number("250_ab12.jpg"), Some("250"));
        assert_eq!(remote_entry_number("250-xyz.mp4"), Some("250"));
        assert_eq!(remote_entry_number("250"), Some("250"));
        assert_eq!(remote_entry_number("cover.png"), None);
        assert_eq!(remote_entry_number("final_250.png"), None);
    }

    #[test]
    fn separator_suffix_wins_on_collision() {
        let mut map = RemoteIdentifierMap::new();
        map.insert("images", "images/26");
        map.insert("images", "images/26_egl2kh");
        assert_eq!(map.get("images", "26"), Some("images/26_egl2kh"));

        // And the other insertion order keeps the suffixed form too.
        let mut map = RemoteIdentifierMap::new();
        map.insert("images", "images/86_zkfndf");
        map.insert("images", "images/86");
        assert_eq!(map.get("images", "86"), Some("images/86_zkfndf"));
    }

    #[test]
    fn apply_rewrites_path_and_thumbnail() {
        let mut map = RemoteIdentifierMap::new();
        map.insert("images", "images/26_egl2kh");
        map.insert("icons", "icons/26");
        let mut items = vec![item("26.png", MediaType::Image, "images/26.png", "icons/26.png")];

        let summary = apply_map(&mut items, &map, &urls());
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.not_found, 0);
        assert_eq!(
            items[0].media.path,
            "https://res.cloudinary.com/test/image/upload/images/26_egl2kh"
        );
        assert_eq!(
            items[0].media.thumbnail,
            "https://res.cloudinary.com/test/image/upload/icons/26"
        );
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut map = RemoteIdentifierMap::new();
        map.insert("images", "images/7_abcd");
        map.insert("icons", "icons/7");
        let mut items = vec![item("7.mp4", MediaType::Video, "images/7.mp4", "icons/7.png")];

        let first = apply_map(&mut items, &map, &urls());
        assert_eq!(first.updated, 2);
        let snapshot = items.clone();

        let second = apply_map(&mut items, &map, &urls());
        assert_eq!(second.updated, 0);
        assert_eq!(items, snapshot);
    }

    #[test]
    fn videos_use_the_video_base_url() {
        let mut map = RemoteIdentifierMap::new();
        map.insert("images", "images/3_vid");
        let mut items = vec![item("3.mov", MediaType::Video, "", "")];
        apply_map(&mut items, &map, &urls());
        assert_eq!(
            items[0].media.path,
            "https://res.cloudinary.com/test/video/upload/images/3_vid"
        );
    }

    #[test]
    fn unmatched_records_are_counted_not_mutated() {
        let map = RemoteIdentifierMap::new();
        let mut items = vec![
            item("cover.png", MediaType::Image, "images/cover.png", "x"),
            item("9.png", MediaType::Image, "images/9.png", "y"),
        ];
        let summary = apply_map(&mut items, &map, &urls());
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.not_found, 2);
        assert_eq!(items[0].media.path, "images/cover.png");
        assert_eq!(items[1].media.path, "images/9.png");
    }

    #[test]
    fn doubled_host_is_collapsed_via_upload_segment() {
        let broken = "https://res.cloudinary.com/test/image/upload/https://res.cloudinary.com/test/image/upload/icons/26";
        assert_eq!(
            repair_doubled_url(broken, "test"),
            "https://res.cloudinary.com/test/image/upload/icons/26"
        );
    }

    #[test]
    fn doubled_host_without_upload_segment_uses_folder_lookup() {
        let broken = "https://res.cloudinary.com/test/x/https://res.cloudinary.com/test/icons/26";
        assert_eq!(
            repair_doubled_url(broken, "test"),
            "https://res.cloudinary.com/test/image/upload/icons/26"
        );
    }

    #[test]
    fn alisa_folder_is_treated_as_video() {
        let broken = "https://a.cloudinary.com/https://b.cloudinary.com/alisa/4";
        assert_eq!(
            repair_doubled_url(broken, "test"),
            "https://res.cloudinary.com/test/video/upload/alisa/4"
        );
    }

    #[test]
    fn repair_declines_without_a_known_folder() {
        let broken = "https://a.cloudinary.com/x/https://b.cloudinary.com/mystery/26";
        assert_eq!(repair_doubled_url(broken, "test"), broken);
    }

    #[test]
    fn repair_is_idempotent_on_correct_urls() {
        let ok = "https://res.cloudinary.com/test/image/upload/icons/26";
        assert_eq!(repair_doubled_url(ok, "test"), ok);
        assert_eq!(repair_doubled_url("icons/26.png", "test"), "icons/26.png");
    }
}
