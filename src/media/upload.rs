use axum::body::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{MediaError, MediaStorage};
use crate::portfolio::ProjectCollection;

lazy_static::lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9.]").unwrap();
    static ref UNSAFE_FOLDER_CHARS: Regex = Regex::new(r"[^a-z0-9_\-]").unwrap();
}

/// A file received from the admin client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

impl UploadPolicy {
    fn check(&self, file: &UploadFile) -> Result<(), MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if file.bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge {
                size: file.bytes.len(),
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Fixed upload destinations used outside the project gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadTarget {
    #[default]
    Uploads,
    Profile,
    Tools,
}

impl UploadTarget {
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadTarget::Uploads => "uploads",
            UploadTarget::Profile => "profile",
            UploadTarget::Tools => "tools",
        }
    }
}

/// Every character outside `[A-Za-z0-9.]` becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// `<prefix>/<epoch-ms>_<sanitized-filename>`
pub fn object_path(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        prefix.trim_end_matches('/'),
        now.timestamp_millis(),
        sanitize_filename(file_name)
    )
}

/// Gallery folder for a project: `projects/<code>/<kind>`, where the code is
/// lowercased and anything outside `[a-z0-9-_]` becomes `-`.
pub fn project_folder(project_code: &str, collection: ProjectCollection) -> String {
    let code = project_code.trim();
    let code = if code.is_empty() { "untitled" } else { code };
    let sanitized = UNSAFE_FOLDER_CHARS.replace_all(&code.to_lowercase(), "-").into_owned();
    format!("projects/{}/{}", sanitized, collection.media_kind())
}

/// Uploads one file under `prefix` and returns its public URL.
pub async fn upload(
    storage: &dyn MediaStorage,
    file: &UploadFile,
    prefix: &str,
    policy: &UploadPolicy,
    now: DateTime<Utc>,
) -> Result<String, MediaError> {
    policy.check(file)?;
    let path = object_path(prefix, &file.file_name, now);
    storage.put(&path, &file.bytes, &file.content_type()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::LocalMediaStorage;
    use chrono::TimeZone;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn sanitize_replaces_everything_but_alnum_and_dots() {
        assert_eq!(sanitize_filename("My Cover (final).png"), "My_Cover__final_.png");
        assert_eq!(sanitize_filename("logo-v2.svg"), "logo_v2.svg");
        assert_eq!(sanitize_filename("café.jpg"), "caf_.jpg");
    }

    #[test]
    fn object_path_prefixes_epoch_millis() {
        let path = object_path("uploads", "hero shot.jpg", at_millis(1_700_000_000_123));
        assert_eq!(path, "uploads/1700000000123_hero_shot.jpg");
    }

    #[test]
    fn project_folder_sanitizes_code_and_picks_kind() {
        assert_eq!(
            project_folder("Atelier Jolie", ProjectCollection::Projects),
            "projects/atelier-jolie/portfolio"
        );
        assert_eq!(
            project_folder("Reel_2024!", ProjectCollection::VisualProductions),
            "projects/reel_2024-/video"
        );
        assert_eq!(
            project_folder("  ", ProjectCollection::Projects),
            "projects/untitled/portfolio"
        );
    }

    #[test]
    fn content_type_is_guessed_from_name() {
        assert_eq!(UploadFile::new("clip.mp4", vec![1u8]).content_type(), "video/mp4");
        assert_eq!(
            UploadFile::new("unknown.zzz", vec![1u8]).content_type(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn upload_rejects_empty_and_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/media");
        let policy = UploadPolicy { max_bytes: 4 };

        let err = upload(&storage, &UploadFile::new("a.png", Vec::<u8>::new()), "uploads", &policy, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Empty));

        let err = upload(&storage, &UploadFile::new("a.png", vec![0u8; 5]), "uploads", &policy, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { size: 5, max: 4 }));
    }

    #[tokio::test]
    async fn upload_stores_under_target_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/media");

        let url = upload(
            &storage,
            &UploadFile::new("figma icon.png", vec![1u8, 2, 3]),
            UploadTarget::Tools.prefix(),
            &UploadPolicy::default(),
            at_millis(42),
        )
        .await
        .unwrap();

        assert_eq!(url, "/media/tools/42_figma_icon.png");
        assert!(dir.path().join("tools/42_figma_icon.png").exists());
    }
}
