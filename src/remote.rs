//! Thin client for the hosted media store's REST API: signed uploads and
//! paginated listings. Everything is sequential; a failure on one call is
//! the caller's per-item problem, except listing, which degrades to partial
//! results on rate limiting.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::config::RemoteCredentials;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const LIST_PAGE_SIZE: u32 = 500;

/// Remote resource type; part of both the API route and the delivery URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Image, ResourceKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }

    /// Kind for a local file, by extension.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "avi" | "webm" => ResourceKind::Video,
            _ => ResourceKind::Image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoteEntry {
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub resources: Vec<RemoteEntry>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
}

/// Result of a full (possibly truncated) listing walk.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<RemoteEntry>,
    /// True when the walk stopped early (rate limit or other API error);
    /// the entries collected so far are still usable.
    pub truncated: bool,
}

pub struct RemoteStore {
    http: reqwest::Client,
    creds: RemoteCredentials,
}

impl RemoteStore {
    pub fn new(creds: RemoteCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            creds,
        }
    }

    pub fn cloud_name(&self) -> &str {
        &self.creds.cloud_name
    }

    /// Upload one file under an explicit public id, overwriting any existing
    /// copy and invalidating cached derivatives. Returns the public id the
    /// store actually assigned.
    pub async fn upload(
        &self,
        local_path: &Path,
        public_id: &str,
        kind: ResourceKind,
    ) -> Result<String> {
        let timestamp = Utc::now().timestamp().to_string();
        // Signed params in alphabetical order; `file`, `api_key` and the
        // resource type stay outside the signature.
        let signature = sign_params(
            &[
                ("invalidate", "true"),
                ("overwrite", "true"),
                ("public_id", public_id),
                ("timestamp", &timestamp),
            ],
            &self.creds.api_secret,
        );

        let bytes = std::fs::read(local_path)
            .with_context(|| format!("failed to read {}", local_path.display()))?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let form = Form::new()
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("overwrite", "true")
            .text("invalidate", "true")
            .text("api_key", self.creds.api_key.clone())
            .text("signature", signature)
            .part("file", Part::bytes(bytes).file_name(file_name));

        let url = format!(
            "{API_BASE}/{}/{}/upload",
            self.creds.cloud_name,
            kind.as_str()
        );
        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("upload of {public_id} failed ({status}): {body}"));
        }
        let parsed: UploadResponse = response
            .json()
            .await
            .context("malformed upload response")?;
        Ok(parsed.public_id)
    }

    /// One page of the stored-entry listing under a prefix.
    pub async fn list_page(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
    ) -> Result<ListPage> {
        let url = format!(
            "{API_BASE}/{}/resources/{}/upload",
            self.creds.cloud_name,
            kind.as_str()
        );
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut request = self
            .http
            .get(&url)
            .basic_auth(&self.creds.api_key, Some(&self.creds.api_secret))
            .query(&[("prefix", prefix), ("max_results", page_size.as_str())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("next_cursor", cursor)]);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("listing {prefix} failed ({status}): {body}"));
        }
        response.json().await.context("malformed listing response")
    }

    /// Walk every page under a prefix. An API error ends the walk with
    /// whatever was collected so far; rate limiting in particular must not
    /// sink the batch, the operator just reruns later.
    pub async fn list_all(&self, prefix: &str, kind: ResourceKind) -> Listing {
        let mut listing = Listing::default();
        let mut cursor: Option<String> = None;

        loop {
            match self.list_page(prefix, kind, cursor.as_deref()).await {
                Ok(page) => {
                    listing.entries.extend(page.resources);
                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(err) => {
                    listing.truncated = true;
                    if is_rate_limit(&err) {
                        warn!(
                            prefix,
                            kind = kind.as_str(),
                            found = listing.entries.len(),
                            "API rate limit reached; using partial listing"
                        );
                    } else {
                        warn!(prefix, kind = kind.as_str(), error = %err, "listing aborted");
                    }
                    break;
                }
            }
        }

        listing
    }
}

fn is_rate_limit(err: &anyhow::Error) -> bool {
    let text = err.to_string();
    text.contains("Rate Limit") || text.contains("420")
}

/// SHA-1 hex of `key=value&...` over the sorted signed params, with the API
/// secret appended. The store's request-signing scheme.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_extension() {
        assert_eq!(ResourceKind::for_path(Path::new("a/26.png")), ResourceKind::Image);
        assert_eq!(ResourceKind::for_path(Path::new("a/7.MOV")), ResourceKind::Video);
        assert_eq!(ResourceKind::for_path(Path::new("a/clip.webm")), ResourceKind::Video);
        assert_eq!(ResourceKind::for_path(Path::new("noext")), ResourceKind::Image);
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        // sha1("public_id=images/26&timestamp=1700000000" + "secret")
        let sig = sign_params(
            &[("timestamp", "1700000000"), ("public_id", "images/26")],
            "secret",
        );
        let mut hasher = Sha1::new();
        hasher.update(b"public_id=images/26&timestamp=1700000000secret");
        let expected: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 40);
    }

    #[test]
    fn rate_limit_detection_matches_api_wording() {
        assert!(is_rate_limit(&anyhow!("listing failed (420 <unknown status code>): Rate Limit Exceeded")));
        assert!(is_rate_limit(&anyhow!("status 420")));
        assert!(!is_rate_limit(&anyhow!("connection reset")));
    }
}
