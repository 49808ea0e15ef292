/*!
 * Portfolio
 * Project documents, the admin project editor and the one-shot import from static assets
 */
pub mod editor;
pub mod import;
pub mod project;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::{ContentStore, OrderBy, StoreError, PROJECTS, VISUAL_PRODUCTIONS};

pub use editor::{EditorError, EditorTarget, ProjectEditor};
pub use import::{import_from_static, ImportReport};
pub use project::{Project, ProjectDocument};

/// The two project collections. The admin UI calls them tabs
/// (`showcase` and `visuals`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectCollection {
    Projects,
    VisualProductions,
}

impl ProjectCollection {
    pub const ALL: [ProjectCollection; 2] = [ProjectCollection::Projects, ProjectCollection::VisualProductions];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCollection::Projects => PROJECTS,
            ProjectCollection::VisualProductions => VISUAL_PRODUCTIONS,
        }
    }

    /// Accepts collection names and tab names.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "projects" | "showcase" => Some(ProjectCollection::Projects),
            "visual_productions" | "visuals" => Some(ProjectCollection::VisualProductions),
            _ => None,
        }
    }

    /// Last path component of a project's media folder.
    pub fn media_kind(&self) -> &'static str {
        match self {
            ProjectCollection::Projects => "portfolio",
            ProjectCollection::VisualProductions => "video",
        }
    }
}

impl fmt::Display for ProjectCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

/// Newest first, undated last. Documents that fail to decode are skipped and
/// logged.
///
/// The store orders on the raw `createdAt` value, which only matches time
/// order for RFC 3339 strings; older documents may hold epoch milliseconds or
/// `{seconds, nanoseconds}` objects, so the list is re-sorted on the parsed
/// timestamp.
pub async fn list_projects(
    store: &dyn ContentStore,
    collection: ProjectCollection,
) -> Result<Vec<Project>, StoreError> {
    let docs = store
        .list(collection.as_str(), Some(&OrderBy::desc("createdAt")))
        .await?;

    let mut projects: Vec<Project> = docs
        .iter()
        .filter_map(|doc| match Project::from_document(&doc.id, &doc.data) {
            Ok(project) => Some(project),
            Err(e) => {
                tracing::warn!(collection = %collection, id = %doc.id, error = %e, "skipping malformed project");
                None
            }
        })
        .collect();
    // Stable, so equal timestamps keep the store's order.
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(projects)
}

/// Irreversible. Deleting an id that does not exist succeeds.
pub async fn delete_project(
    store: &dyn ContentStore,
    collection: ProjectCollection,
    id: &str,
) -> Result<(), StoreError> {
    store.delete_document(collection.as_str(), id).await?;
    tracing::info!(collection = %collection, id = %id, "project deleted");
    Ok(())
}
