use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::{MediaType, Project, ProjectCollection};
use crate::assets::VideoAsset;
use crate::store::{ContentStore, StoreError};

lazy_static::lazy_static! {
    static ref EXTENSION: Regex = Regex::new(r"\.[^/.]+$").unwrap();
}

pub const DEFAULT_BRAND_CATEGORY: &str = "Branding & Visual Identity";
pub const VISUAL_CATEGORY: &str = "Visual Production";
pub const DEFAULT_VISUAL_TITLE: &str = "Visual Project";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub projects: usize,
    pub visual_productions: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.projects + self.visual_productions
    }

    pub fn message(&self) -> String {
        if self.total() == 0 {
            "No new items to import".to_string()
        } else {
            format!(
                "Imported {} projects and {} visual productions",
                self.projects, self.visual_productions
            )
        }
    }
}

/// Brand name from an image path: the file name without its extension.
pub fn brand_name(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or_default();
    EXTENSION.replace(file_name, "").into_owned()
}

pub fn brand_category(brand: &str) -> &'static str {
    match brand {
        "Atelier Jolie" => "Art, Fashion & Community",
        "Gridhaus" => "Sports & Lifestyle",
        _ => DEFAULT_BRAND_CATEGORY,
    }
}

fn brand_project(path: &str) -> Project {
    let title = brand_name(path);
    Project {
        brand_categories: vec![brand_category(&title).to_string()],
        title,
        thumbnail_url: path.to_string(),
        gallery_urls: vec![path.to_string()],
        media_type: MediaType::Image,
        ..Project::default()
    }
}

fn visual_project(video: &VideoAsset) -> Project {
    let title = if video.alt.is_empty() {
        DEFAULT_VISUAL_TITLE.to_string()
    } else {
        video.alt.clone()
    };
    Project {
        title,
        brand_categories: vec![VISUAL_CATEGORY.to_string()],
        thumbnail_url: video.src.clone(),
        gallery_urls: vec![video.src.clone()],
        media_type: video.media_type,
        alt: video.alt.clone(),
        ..Project::default()
    }
}

/// Writes `items` as one batch when `collection` is still empty.
///
/// Items are stamped a millisecond apart so newest-first listing shows them
/// in reverse input order instead of an arbitrary one.
async fn seed_collection(
    store: &dyn ContentStore,
    collection: ProjectCollection,
    items: Vec<Project>,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    if items.is_empty() {
        return Ok(0);
    }
    let existing = store.list(collection.as_str(), None).await?;
    if !existing.is_empty() {
        tracing::info!(collection = %collection, existing = existing.len(), "collection not empty, skipping import");
        return Ok(0);
    }

    let documents = items
        .into_iter()
        .enumerate()
        .map(|(index, mut project)| {
            let stamp = now + Duration::milliseconds(index as i64);
            project.created_at = Some(stamp);
            project.updated_at = Some(stamp);
            project.to_document()
        })
        .collect::<Result<Vec<Value>, _>>()?;

    let ids = store.batch_write(collection.as_str(), documents).await?;
    tracing::info!(collection = %collection, imported = ids.len(), "imported static assets");
    Ok(ids.len())
}

/// Seeds the project collections from the static site's assets.
///
/// Each collection is only seeded while it is empty. That check is a
/// heuristic: if some documents were deleted by hand the import is skipped,
/// and nothing prevents the same files from being imported again after a
/// full clear.
pub async fn import_from_static(
    store: &dyn ContentStore,
    brand_images: &[String],
    videos: &[VideoAsset],
    now: DateTime<Utc>,
) -> Result<ImportReport, StoreError> {
    let projects = seed_collection(
        store,
        ProjectCollection::Projects,
        brand_images.iter().map(|path| brand_project(path)).collect(),
        now,
    )
    .await?;

    let visual_productions = seed_collection(
        store,
        ProjectCollection::VisualProductions,
        videos.iter().map(visual_project).collect(),
        now,
    )
    .await?;

    Ok(ImportReport {
        projects,
        visual_productions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::list_projects;
    use crate::store::{MemoryStore, PROJECTS, VISUAL_PRODUCTIONS};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn brand_images() -> Vec<String> {
        ["Atelier Jolie.png", "Gridhaus.jpg", "Nordlys.svg"]
            .iter()
            .map(|f| format!("/assets/card/branddesign/{}", f))
            .collect()
    }

    fn videos() -> Vec<VideoAsset> {
        vec![
            VideoAsset::new(0, "/assets/video/reel.mp4", "reel.mp4"),
            VideoAsset::new(1, "/assets/video/teaser.webm", ""),
        ]
    }

    #[test]
    fn brand_names_and_categories() {
        assert_eq!(brand_name("/assets/card/branddesign/Atelier Jolie.png"), "Atelier Jolie");
        assert_eq!(brand_name("archive.v2.webp"), "archive.v2");
        assert_eq!(brand_category("Atelier Jolie"), "Art, Fashion & Community");
        assert_eq!(brand_category("Gridhaus"), "Sports & Lifestyle");
        assert_eq!(brand_category("Nordlys"), DEFAULT_BRAND_CATEGORY);
    }

    #[tokio::test]
    async fn empty_store_imports_everything_in_one_batch_per_collection() {
        let store = MemoryStore::new();
        let report = import_from_static(&store, &brand_images(), &videos(), now())
            .await
            .unwrap();

        assert_eq!(report, ImportReport { projects: 3, visual_productions: 2 });
        assert_eq!(store.write_count(), 2);

        let projects = list_projects(&store, ProjectCollection::Projects).await.unwrap();
        let gridhaus = projects.iter().find(|p| p.title == "Gridhaus").unwrap();
        assert_eq!(gridhaus.brand_categories, vec!["Sports & Lifestyle"]);
        assert_eq!(gridhaus.thumbnail_url, "/assets/card/branddesign/Gridhaus.jpg");

        let visuals = list_projects(&store, ProjectCollection::VisualProductions).await.unwrap();
        let titles: Vec<&str> = visuals.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Visual Project", "reel.mp4"]);
        assert!(visuals.iter().all(|p| p.media_type == MediaType::Video));
        assert!(visuals.iter().all(|p| p.brand_categories == vec![VISUAL_CATEGORY]));
    }

    #[tokio::test]
    async fn imported_documents_carry_legacy_fields() {
        let store = MemoryStore::new();
        import_from_static(&store, &brand_images(), &[], now()).await.unwrap();

        let docs = store.list(PROJECTS, None).await.unwrap();
        let jolie = docs.iter().find(|d| d.data["code"] == "Atelier Jolie").unwrap();
        assert_eq!(jolie.data["category"], "Art, Fashion & Community");
        assert_eq!(jolie.data["src"], "/assets/card/branddesign/Atelier Jolie.png");
        assert_eq!(jolie.data["type"], "image");
    }

    #[tokio::test]
    async fn non_empty_collections_are_left_alone() {
        let store = MemoryStore::new();
        store.set(PROJECTS, "p1", json!({ "title": "Existing" })).await.unwrap();
        store.set(VISUAL_PRODUCTIONS, "v1", json!({ "title": "Existing" })).await.unwrap();
        let writes_before = store.write_count();

        let report = import_from_static(&store, &brand_images(), &videos(), now())
            .await
            .unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(report.message(), "No new items to import");
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn only_the_empty_collection_is_seeded() {
        let store = MemoryStore::new();
        store.set(PROJECTS, "p1", json!({ "title": "Existing" })).await.unwrap();

        let report = import_from_static(&store, &brand_images(), &videos(), now())
            .await
            .unwrap();
        assert_eq!(report, ImportReport { projects: 0, visual_productions: 2 });
    }

    #[tokio::test]
    async fn unavailable_store_fails_the_import() {
        let store = MemoryStore::new();
        store.set_online(false);
        let err = import_from_static(&store, &brand_images(), &videos(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
