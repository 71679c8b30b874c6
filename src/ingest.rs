//! Ingestion pipeline: spreadsheet rows + local media folders in,
//! [`PortfolioItem`]s out.
//!
//! The title/description split is a heuristic tuned against the historical
//! dataset, not a general classifier. The 50-character threshold and the
//! shortest-to-title / longest-to-description tie-breaks must stay as-is for
//! output compatibility with the published `portfolio_data.json`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::PathMode;
use crate::model::{Media, MediaType, PortfolioItem};

/// Shortest acceptable description, in characters. Below this (with more
/// than one text cell available) the description is rebuilt from all
/// non-title cells.
const MIN_DESCRIPTION_CHARS: usize = 50;

fn any_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)").expect("static regex"))
}

/// First run of digits anywhere in a file name; the join key between
/// spreadsheet rows, local files and remote identifiers.
pub fn extract_number(name: &str) -> Option<u64> {
    any_number_re()
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
}

/// A locally discovered full-resolution asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub filename: String,
    pub kind: MediaType,
}

/// Non-recursive scan of the images directory, keyed by extracted number.
/// Duplicate numbers are last-write-wins in directory-listing order; the
/// historical tooling behaved this way and the data relies on it.
pub fn scan_media_dir(dir: &Path) -> Result<HashMap<u64, MediaFile>> {
    let mut files = HashMap::new();
    if !dir.exists() {
        warn!(dir = %dir.display(), "media directory not found; skipping");
        return Ok(files);
    }
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        let Some(num) = extract_number(&filename) else {
            debug!(file = %filename, "no number in media file name; ignored");
            continue;
        };
        let ext = Path::new(&filename)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.insert(
            num,
            MediaFile {
                filename,
                kind: MediaType::from_extension(&ext),
            },
        );
    }
    Ok(files)
}

/// Non-recursive scan of the icons directory: number -> thumbnail file name.
/// A missing directory yields an empty map (every record then falls back to
/// its own media path).
pub fn scan_thumbnail_dir(dir: &Path) -> Result<HashMap<u64, String>> {
    let mut thumbs = HashMap::new();
    if !dir.exists() {
        warn!(dir = %dir.display(), "icons directory not found; thumbnails will fall back");
        return Ok(thumbs);
    }
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        if let Some(num) = extract_number(&filename) {
            thumbs.insert(num, filename);
        }
    }
    Ok(thumbs)
}

/// Title, description and the raw cell map inferred from one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowText {
    pub title: String,
    pub description: String,
    pub additional: IndexMap<String, String>,
}

/// Infer title/description from a row's non-empty cells.
///
/// Shortest cell becomes the title, longest the description (stable sort, so
/// ties keep column order). When the two coincide, fall back to first column
/// as title and the remaining columns joined with blank lines as
/// description. Finally, an implausibly short description is rebuilt from
/// every non-title cell.
pub fn infer_row_text(cells: &[Option<String>]) -> RowText {
    let mut out = RowText::default();
    let mut texts: Vec<String> = Vec::new();

    for (col_idx, cell) in cells.iter().enumerate() {
        if let Some(raw) = cell {
            let value = raw.trim();
            if !value.is_empty() {
                texts.push(value.to_string());
                out.additional.insert(format!("col_{col_idx}"), value.to_string());
            }
        }
    }

    if texts.is_empty() {
        return out;
    }

    let mut by_length = texts.clone();
    by_length.sort_by_key(|t| t.chars().count());
    out.title = by_length.first().cloned().unwrap_or_default();
    out.description = by_length.last().cloned().unwrap_or_default();

    if out.title == out.description {
        if let Some(first_col) = out.additional.get("col_0").cloned() {
            out.title = first_col;
            let rest: Vec<&str> = (1..cells.len())
                .filter_map(|col_idx| {
                    out.additional
                        .get(&format!("col_{col_idx}"))
                        .map(String::as_str)
                })
                .collect();
            if !rest.is_empty() {
                out.description = rest.join("\n\n");
            } else if texts.len() > 1 {
                out.description = texts[1..].join("\n\n");
            }
        }
    }

    if out.description.chars().count() < MIN_DESCRIPTION_CHARS && texts.len() > 1 {
        out.description = texts
            .iter()
            .filter(|t| **t != out.title)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");
    }

    out
}

/// Assemble portfolio records from spreadsheet rows and the local scans.
///
/// Row 0 pairs with media file number 1. Rows with no matching media file
/// are dropped entirely, so ids are dense over the emitted list.
pub fn build_items(
    rows: &[Vec<Option<String>>],
    media_files: &HashMap<u64, MediaFile>,
    thumbnails: &HashMap<u64, String>,
    mode: &PathMode,
) -> Vec<PortfolioItem> {
    let mut items = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u64 + 1;
        let Some(media_file) = media_files.get(&row_num) else {
            continue;
        };

        let thumbnail_rel = match thumbnails.get(&row_num) {
            Some(icon) => format!("icons/{icon}"),
            None => format!("images/{}", media_file.filename),
        };

        let (path, thumbnail) = match mode {
            PathMode::Local => (format!("images/{}", media_file.filename), thumbnail_rel),
            PathMode::Remote(urls) => {
                let base = match media_file.kind {
                    MediaType::Video => &urls.video_base,
                    MediaType::Image => &urls.image_base,
                };
                let path = format!("{base}{}", media_file.filename);
                let thumbnail = if let Some(icon) = thumbnail_rel.strip_prefix("icons/") {
                    format!("{}icons/{icon}", urls.image_base)
                } else if let Some(img) = thumbnail_rel.strip_prefix("images/") {
                    format!("{}{img}", urls.image_base)
                } else {
                    format!("{}{thumbnail_rel}", urls.image_base)
                };
                (path, thumbnail)
            }
        };

        let text = infer_row_text(row);
        items.push(PortfolioItem {
            id: row_num,
            media: Media {
                filename: media_file.filename.clone(),
                kind: media_file.kind,
                path,
                thumbnail,
            },
            title: text.title,
            description: text.description,
            additional: text.additional,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryUrls;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn single_cell_becomes_title_and_description() {
        let row = vec![None, Some("  Витраж  ".to_string()), None];
        let text = infer_row_text(&row);
        assert_eq!(text.title, "Витраж");
        assert_eq!(text.description, "Витраж");
        assert_eq!(text.additional.get("col_1").unwrap(), "Витраж");
    }

    #[test]
    fn shortest_is_title_longest_is_description() {
        let long = "Роспись стен в детской комнате, акрил по штукатурке, два месяца работы";
        let row = cells(&["Мурал", long]);
        let text = infer_row_text(&row);
        assert_eq!(text.title, "Мурал");
        assert_eq!(text.description, long);
    }

    #[test]
    fn equal_length_cells_fall_back_to_first_column() {
        let text = infer_row_text(&cells(&["Cat", "Dog", "Owl"]));
        assert_eq!(text.title, "Cat");
        assert_eq!(text.description, "Dog\n\nOwl");
    }

    #[test]
    fn short_description_rebuilt_from_non_title_cells() {
        let text = infer_row_text(&cells(&["A", "B"]));
        assert_eq!(text.title, "A");
        assert_eq!(text.description, "B");
    }

    #[test]
    fn empty_row_yields_empty_text() {
        let text = infer_row_text(&[None, Some("   ".to_string())]);
        assert_eq!(text.title, "");
        assert_eq!(text.description, "");
        assert!(text.additional.is_empty());
    }

    #[test]
    fn number_extraction_takes_first_digit_run() {
        assert_eq!(extract_number("12.png"), Some(12));
        assert_eq!(extract_number("IMG_034_final.jpg"), Some(34));
        assert_eq!(extract_number("cover.png"), None);
    }

    #[test]
    fn rows_without_media_are_dropped() {
        let rows = vec![cells(&["one"]), cells(&["two"]), cells(&["three"])];
        let mut media = HashMap::new();
        media.insert(
            2,
            MediaFile {
                filename: "2.png".into(),
                kind: MediaType::Image,
            },
        );
        let items = build_items(&rows, &media, &HashMap::new(), &PathMode::Local);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].media.path, "images/2.png");
    }

    #[test]
    fn thumbnail_falls_back_to_media_path() {
        let rows = vec![cells(&["only"])];
        let mut media = HashMap::new();
        media.insert(
            1,
            MediaFile {
                filename: "1.mp4".into(),
                kind: MediaType::Video,
            },
        );
        let items = build_items(&rows, &media, &HashMap::new(), &PathMode::Local);
        assert_eq!(items[0].media.thumbnail, items[0].media.path);
    }

    #[test]
    fn remote_mode_uses_per_type_base_urls() {
        let rows = vec![cells(&["row one"]), cells(&["row two"])];
        let mut media = HashMap::new();
        media.insert(
            1,
            MediaFile {
                filename: "1.png".into(),
                kind: MediaType::Image,
            },
        );
        media.insert(
            2,
            MediaFile {
                filename: "2.mp4".into(),
                kind: MediaType::Video,
            },
        );
        let mut thumbs = HashMap::new();
        thumbs.insert(1, "1.png".to_string());
        let mode = PathMode::Remote(DeliveryUrls {
            image_base: "https://cdn.test/image/upload/".into(),
            video_base: "https://cdn.test/video/upload/".into(),
        });
        let items = build_items(&rows, &media, &thumbs, &mode);
        assert_eq!(items[0].media.path, "https://cdn.test/image/upload/1.png");
        assert_eq!(
            items[0].media.thumbnail,
            "https://cdn.test/image/upload/icons/1.png"
        );
        assert_eq!(items[1].media.path, "https://cdn.test/video/upload/2.mp4");
        // fallback thumbnail routes through the image base without a folder
        assert_eq!(
            items[1].media.thumbnail,
            "https://cdn.test/image/upload/2.mp4"
        );
    }
}
