use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::{MediaError, MediaStorage};

/// Object storage backed by a local directory that the router serves under `/media`.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative paths are accepted: no `..`, no absolute or prefixed paths.
    fn resolve(&self, path: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain || path.contains('\\') || path.contains('\0') {
            return Err(MediaError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String, MediaError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::info!(
            path = %path,
            size = bytes.len(),
            content_type = %content_type,
            "media object stored"
        );
        Ok(format!("{}/{}", self.public_base, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "https://cdn.example.com/media/");

        let url = storage
            .put("uploads/1700000000000_cover.png", b"png-bytes", "image/png")
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://cdn.example.com/media/uploads/1700000000000_cover.png"
        );
        let written = std::fs::read(dir.path().join("uploads/1700000000000_cover.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn put_rejects_traversal_and_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/media");

        for bad in ["../escape.png", "/etc/passwd", "", "a/../../b"] {
            let err = storage.put(bad, b"x", "text/plain").await.unwrap_err();
            assert!(matches!(err, MediaError::InvalidPath(_)), "accepted {bad:?}");
        }
    }
}
