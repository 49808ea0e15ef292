use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::media::{MediaError, MediaStorage, UploadFile};

/// Uploaded relative path → public URL.
pub type AssetManifest = BTreeMap<String, String>;

#[derive(Debug, Default)]
pub struct PushReport {
    pub manifest: AssetManifest,
    pub failed: Vec<String>,
}

/// Every regular file under `root`, depth first, sorted by name per directory.
/// Blocking; async callers go through `spawn_blocking`.
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Relative path with forward slashes, or `None` when `file` is outside `root`.
pub fn relative_key(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

pub fn storage_key(relative: &str) -> String {
    format!("assets/{}", relative)
}

async fn push_one(storage: &dyn MediaStorage, path: &Path, relative: &str) -> Result<String, MediaError> {
    let bytes = tokio::fs::read(path).await?;
    let file = UploadFile::new(relative, bytes);
    storage.put(&storage_key(relative), &file.bytes, &file.content_type()).await
}

/// Uploads the whole tree. A file that fails is logged and skipped.
pub async fn push_assets(storage: &dyn MediaStorage, root: &Path) -> Result<PushReport, MediaError> {
    let mut report = PushReport::default();

    let walk_root = root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || collect_files(&walk_root))
        .await
        .map_err(io::Error::other)??;

    for path in files {
        let Some(relative) = relative_key(root, &path) else {
            continue;
        };

        match push_one(storage, &path, &relative).await {
            Ok(url) => {
                tracing::info!(asset = %relative, url = %url, "uploaded asset");
                report.manifest.insert(relative, url);
            }
            Err(e) => {
                tracing::error!(asset = %relative, error = %e, "failed to upload asset");
                report.failed.push(relative);
            }
        }
    }

    Ok(report)
}

pub async fn write_manifest(path: &Path, manifest: &AssetManifest) -> io::Result<()> {
    let json = serde_json::to_string_pretty(manifest).map_err(io::Error::other)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await
}
