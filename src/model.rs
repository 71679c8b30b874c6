//! The portfolio metadata record and the JSON store it lives in.
//!
//! `portfolio_data.json` holds an ordered list of [`PortfolioItem`]s and is
//! only ever updated read-modify-write by one tool at a time. Output keeps
//! non-ASCII text literal and 2-space indentation so diffs against the
//! historical file stay readable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default location of the metadata store, relative to the working directory.
pub const PORTFOLIO_STORE: &str = "portfolio_data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify by file extension. The video set is fixed; everything else
    /// is treated as an image.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "avi" | "webm" => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Original local file name, e.g. `"12.png"`.
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    /// URL or local relative path to the full-resolution asset.
    pub path: String,
    /// URL or local relative path to the preview asset. Never empty: falls
    /// back to `path` when no dedicated thumbnail exists.
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    /// 1-based ordinal of the source spreadsheet row.
    pub id: u64,
    pub media: Media,
    pub title: String,
    pub description: String,
    /// Raw non-empty cell text keyed by `col_<index>`.
    pub additional: IndexMap<String, String>,
}

pub fn load_items(path: &Path) -> Result<Vec<PortfolioItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("malformed JSON in {}", path.display()))
}

pub fn save_items(path: &Path, items: &[PortfolioItem]) -> Result<()> {
    let rendered = serde_json::to_string_pretty(items)?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_extensions_are_case_insensitive() {
        assert_eq!(MediaType::from_extension(".MP4"), MediaType::Video);
        assert_eq!(MediaType::from_extension("mov"), MediaType::Video);
        assert_eq!(MediaType::from_extension(".webm"), MediaType::Video);
        assert_eq!(MediaType::from_extension(".avi"), MediaType::Video);
        assert_eq!(MediaType::from_extension(".png"), MediaType::Image);
        assert_eq!(MediaType::from_extension(""), MediaType::Image);
    }

    #[test]
    fn json_round_trip_keeps_cyrillic_literal() {
        let item = PortfolioItem {
            id: 1,
            media: Media {
                filename: "1.png".into(),
                kind: MediaType::Image,
                path: "images/1.png".into(),
                thumbnail: "icons/1.png".into(),
            },
            title: "Артбук".into(),
            description: "Обложка и развороты".into(),
            additional: IndexMap::new(),
        };
        let rendered = serde_json::to_string_pretty(&[item.clone()]).unwrap();
        assert!(rendered.contains("Артбук"));
        assert!(!rendered.contains("\\u"));
        let parsed: Vec<PortfolioItem> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, vec![item]);
    }
}
