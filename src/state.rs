use std::sync::Arc;

use crate::assets::StaticCatalog;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::media::{LocalMediaStorage, SharedMedia, UploadPolicy};
use crate::store::{ContentStore, SharedStore, StoreError};

/// Shared handles every handler receives.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the server runs without a content store.
    pub store: Option<SharedStore>,
    pub media: SharedMedia,
    pub catalog: Arc<StaticCatalog>,
    pub upload_policy: UploadPolicy,
    pub upload_concurrency: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Option<SharedStore>) -> Self {
        Self {
            store,
            media: Arc::new(LocalMediaStorage::new(&config.media_root, &config.media_public_base)),
            catalog: Arc::new(StaticCatalog::new(&config.static_root)),
            upload_policy: UploadPolicy {
                max_bytes: config.max_upload_bytes,
            },
            upload_concurrency: config.upload_concurrency,
        }
    }

    /// Store for reads that degrade to defaults.
    pub fn read_store(&self) -> Option<&dyn ContentStore> {
        self.store.as_deref()
    }

    /// Store for writes; a missing store is a 503.
    pub fn store(&self) -> Result<&dyn ContentStore, AppError> {
        self.store
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("no content store configured".to_string()).into())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::StoreBackend;
    use std::path::Path;

    /// State rooted in `dir`: media under `dir/media`, static assets under `dir/public`.
    pub fn state_in(dir: &Path, store: Option<SharedStore>) -> AppState {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            store_backend: StoreBackend::Memory,
            media_root: dir.join("media"),
            media_public_base: "/media".to_string(),
            static_root: dir.join("public"),
            max_upload_bytes: 1024 * 1024,
            max_request_bytes: 8 * 1024 * 1024,
            upload_concurrency: 2,
        };
        AppState::new(&config, store)
    }
}
