use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use super::{upload, MediaError, MediaStorage, UploadFile, UploadPolicy};

/// Ordered gallery plus a cover pointer into it.
///
/// Invariant: when `gallery_urls` is non-empty, `thumbnail_url` is one of its
/// entries (or empty before a cover has been picked).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub gallery_urls: Vec<String>,
}

impl Gallery {
    pub fn new(thumbnail_url: impl Into<String>, gallery_urls: Vec<String>) -> Self {
        Self {
            thumbnail_url: thumbnail_url.into(),
            gallery_urls,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.gallery_urls.iter().any(|u| u == url)
    }

    /// Uploads `files` into `folder` and appends the resulting URLs in input
    /// order. Up to `concurrency` uploads run at once. If any upload fails the
    /// gallery is left untouched.
    pub async fn add_files(
        &mut self,
        storage: &dyn MediaStorage,
        files: &[UploadFile],
        folder: &str,
        policy: &UploadPolicy,
        concurrency: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, MediaError> {
        // Boxed before buffering so the handler future stays `Send`.
        let pending: Vec<BoxFuture<'_, Result<String, MediaError>>> = files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                // One millisecond apart so same-named files in a batch get distinct paths.
                let stamp = now + Duration::milliseconds(index as i64);
                upload(storage, file, folder, policy, stamp).boxed()
            })
            .collect();

        let uploaded: Vec<String> = stream::iter(pending)
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        if self.thumbnail_url.is_empty() {
            if let Some(first) = uploaded.first() {
                self.thumbnail_url = first.clone();
            }
        }
        self.gallery_urls.extend(uploaded.iter().cloned());

        tracing::debug!(added = uploaded.len(), folder = %folder, "gallery files added");
        Ok(uploaded)
    }

    /// Removes every occurrence of `url`. A removed cover moves to the new
    /// first entry, or is cleared when the gallery becomes empty.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.gallery_urls.len();
        self.gallery_urls.retain(|u| u != url);
        let removed = self.gallery_urls.len() != before;

        if self.thumbnail_url == url {
            self.thumbnail_url = self.gallery_urls.first().cloned().unwrap_or_default();
        }
        removed
    }

    pub fn set_cover(&mut self, url: &str) -> Result<(), MediaError> {
        if !self.contains(url) {
            return Err(MediaError::NotInGallery(url.to_string()));
        }
        self.thumbnail_url = url.to_string();
        Ok(())
    }

    /// Re-establishes the cover invariant for drafts edited outside this type.
    pub fn normalize(&mut self) {
        if !self.gallery_urls.is_empty() && !self.contains(&self.thumbnail_url) {
            self.thumbnail_url = self.gallery_urls[0].clone();
        }
    }
}
