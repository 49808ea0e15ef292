use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::portfolio::MediaType;

lazy_static::lazy_static! {
    static ref IMAGE_FILE: Regex = Regex::new(r"(?i)\.(png|jpe?g|svg|webp)$").unwrap();
    static ref VIDEO_FILE: Regex = Regex::new(r"(?i)\.(mp4|mov|webm)$").unwrap();
}

pub const BRAND_DESIGN_DIR: &str = "assets/card/branddesign";
pub const VISUALS_DIR: &str = "assets/card/visuals";
pub const VIDEO_DIR: &str = "assets/video";
pub const COMPANY_LOGO_DIR: &str = "assets/companylogo";

/// Logos named like this are layout placeholders, not clients.
const PLACEHOLDER_LOGO_PREFIX: &str = "logocompany";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: String,
    pub src: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub alt: String,
}

impl VideoAsset {
    pub fn new(index: usize, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: format!("video-{}", index),
            src: src.into(),
            media_type: MediaType::Video,
            alt: alt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLogo {
    pub name: String,
    pub src: String,
}

/// Listings of the static `assets/` tree the public site ships with.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    root: PathBuf,
}

impl StaticCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names in `dir` (relative to the root), sorted.
    async fn file_names(&self, dir: &str) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(self.root.join(dir)).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn images_in(&self, dir: &str) -> Vec<String> {
        match self.file_names(dir).await {
            Ok(names) => names
                .into_iter()
                .filter(|name| IMAGE_FILE.is_match(name))
                .map(|name| format!("/{}/{}", dir, name))
                .collect(),
            Err(e) => {
                tracing::warn!(dir = %dir, error = %e, "cannot read image directory");
                Vec::new()
            }
        }
    }

    pub async fn brand_design_images(&self) -> Vec<String> {
        self.images_in(BRAND_DESIGN_DIR).await
    }

    pub async fn visual_production_images(&self) -> Vec<String> {
        self.images_in(VISUALS_DIR).await
    }

    /// A missing video directory is an empty listing; any other read error
    /// is returned.
    pub async fn videos(&self) -> io::Result<Vec<VideoAsset>> {
        let names = match self.file_names(VIDEO_DIR).await {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(names
            .into_iter()
            .filter(|name| VIDEO_FILE.is_match(name))
            .enumerate()
            .map(|(index, name)| VideoAsset::new(index, format!("/{}/{}", VIDEO_DIR, name), name))
            .collect())
    }

    pub async fn company_logos(&self) -> Vec<CompanyLogo> {
        let names = match self.file_names(COMPANY_LOGO_DIR).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read company logo directory");
                return Vec::new();
            }
        };

        names
            .into_iter()
            .filter(|name| name.ends_with(".svg") && !name.starts_with(PLACEHOLDER_LOGO_PREFIX))
            .map(|name| CompanyLogo {
                name: name.replacen(".svg", "", 1).replace('_', " "),
                src: format!("/{}/{}", COMPANY_LOGO_DIR, name),
            })
            .collect()
    }
}
