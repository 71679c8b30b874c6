//! Remote-host configuration, materialized once from the environment and
//! passed explicitly into the operations that need it.

use anyhow::{Context, Result};

use crate::util::env::{env_flag, env_opt, env_req};

/// Cloud name of the account the portfolio was originally migrated to.
/// Used as the fallback when `CLOUDINARY_CLOUD_NAME` is not configured.
pub const DEFAULT_CLOUD_NAME: &str = "dwwyducge";

/// API credentials for the remote media store. Required for upload and
/// listing operations; absence is a fatal precondition there.
#[derive(Debug, Clone)]
pub struct RemoteCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl RemoteCredentials {
    pub fn from_env() -> Result<Self> {
        let cloud_name = env_req("CLOUDINARY_CLOUD_NAME")
            .context("CLOUDINARY_CLOUD_NAME not set; check your .env file")?;
        let api_key = env_req("CLOUDINARY_API_KEY")
            .context("CLOUDINARY_API_KEY not set; check your .env file")?;
        let api_secret = env_req("CLOUDINARY_API_SECRET")
            .context("CLOUDINARY_API_SECRET not set; check your .env file")?;
        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
        })
    }
}

/// Public delivery base URLs, one per resource type. Each ends with a
/// trailing slash so a public id can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryUrls {
    pub image_base: String,
    pub video_base: String,
}

impl DeliveryUrls {
    /// Base URLs for a given cloud name.
    pub fn for_cloud(cloud_name: &str) -> Self {
        Self {
            image_base: format!("https://res.cloudinary.com/{cloud_name}/image/upload/"),
            video_base: format!("https://res.cloudinary.com/{cloud_name}/video/upload/"),
        }
    }

    /// `CLOUDINARY_IMAGE_URL` / `CLOUDINARY_VIDEO_URL`, falling back to the
    /// URLs derived from the configured (or default) cloud name.
    pub fn from_env() -> Self {
        let defaults = Self::for_cloud(&cloud_name_from_env());
        Self {
            image_base: env_opt("CLOUDINARY_IMAGE_URL").unwrap_or(defaults.image_base),
            video_base: env_opt("CLOUDINARY_VIDEO_URL").unwrap_or(defaults.video_base),
        }
    }
}

/// Cloud name from the environment, or the historical default.
pub fn cloud_name_from_env() -> String {
    env_opt("CLOUDINARY_CLOUD_NAME").unwrap_or_else(|| DEFAULT_CLOUD_NAME.to_string())
}

/// Whether generated metadata should point at the remote store or at local
/// relative paths. Remote mode requires both the `USE_CLOUDINARY` flag and an
/// explicit image base URL; anything less degrades to local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMode {
    Local,
    Remote(DeliveryUrls),
}

impl PathMode {
    pub fn from_env() -> Self {
        if !env_flag("USE_CLOUDINARY", false) {
            return PathMode::Local;
        }
        match env_opt("CLOUDINARY_IMAGE_URL") {
            Some(image_base) => {
                let video_base =
                    env_opt("CLOUDINARY_VIDEO_URL").unwrap_or_else(|| image_base.clone());
                PathMode::Remote(DeliveryUrls {
                    image_base,
                    video_base,
                })
            }
            None => PathMode::Local,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, PathMode::Remote(_))
    }
}
