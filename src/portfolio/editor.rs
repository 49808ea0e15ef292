use chrono::{DateTime, Utc};

use super::{Project, ProjectCollection};
use crate::store::{ContentStore, StoreError};

/// Admin list view a client returns to when a project cannot be opened.
pub const PORTFOLIO_LIST_PATH: &str = "/admin/portfolio";

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Project {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed project document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(String),
}

impl EditorTarget {
    /// A missing, blank or `"new"` id opens an empty draft.
    pub fn parse(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("") | Some("new") => EditorTarget::New,
            Some(id) => EditorTarget::Existing(id.to_string()),
        }
    }
}

/// One editing session on a project draft.
#[derive(Debug, Clone)]
pub struct ProjectEditor {
    collection: ProjectCollection,
    target: EditorTarget,
    project: Project,
}

impl ProjectEditor {
    pub fn new_draft(collection: ProjectCollection) -> Self {
        Self {
            collection,
            target: EditorTarget::New,
            project: Project::default(),
        }
    }

    pub async fn load(
        store: &dyn ContentStore,
        collection: ProjectCollection,
        target: EditorTarget,
    ) -> Result<Self, EditorError> {
        let id = match target {
            EditorTarget::New => return Ok(Self::new_draft(collection)),
            EditorTarget::Existing(id) => id,
        };

        let doc = store
            .get(collection.as_str(), &id)
            .await?
            .ok_or_else(|| EditorError::NotFound(id.clone()))?;
        let project = Project::from_document(&doc.id, &doc.data)?;

        Ok(Self {
            collection,
            target: EditorTarget::Existing(id),
            project,
        })
    }

    pub fn is_new(&self) -> bool {
        self.target == EditorTarget::New
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// Replaces the editable fields with a client draft. The id and the
    /// creation time stay those of the loaded document.
    pub fn apply_draft(&mut self, draft: Project) {
        let id = std::mem::take(&mut self.project.id);
        let created_at = self.project.created_at;
        self.project = Project {
            id,
            created_at,
            updated_at: self.project.updated_at,
            ..draft
        };
    }

    /// Persists the draft with exactly one store write and returns the id.
    ///
    /// A blank title is rejected before the store is touched. `createdAt` is
    /// stamped only when the project is first created; `updatedAt` on every
    /// save.
    pub async fn save(&mut self, store: &dyn ContentStore, now: DateTime<Utc>) -> Result<String, EditorError> {
        if self.project.title.trim().is_empty() {
            return Err(EditorError::Validation("Project Title is required".to_string()));
        }

        let mut project = self.project.clone();
        project.content = ammonia::clean(&project.content);
        let mut gallery = project.gallery();
        gallery.normalize();
        project.set_gallery(gallery);
        project.updated_at = Some(now);
        if self.is_new() {
            project.created_at = Some(now);
        }

        let document = project.to_document()?;
        let id = match &self.target {
            EditorTarget::New => store.add_document(self.collection.as_str(), document).await?,
            EditorTarget::Existing(id) => {
                store.set(self.collection.as_str(), id, document).await?;
                id.clone()
            }
        };

        tracing::info!(
            collection = %self.collection,
            id = %id,
            created = self.is_new(),
            "project saved"
        );

        project.id = id.clone();
        self.project = project;
        self.target = EditorTarget::Existing(id.clone());
        Ok(id)
    }
}
