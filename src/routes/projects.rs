/**
 * Project Routes
 * Public project listings and the admin project editor
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::portfolio::{
    delete_project, import_from_static, list_projects, EditorTarget, ImportReport, Project,
    ProjectCollection, ProjectEditor,
};
use crate::routes::auth::AdminSession;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub projects: usize,
    pub visual_productions: usize,
    pub message: String,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            projects: report.projects,
            visual_productions: report.visual_productions,
            message: report.message(),
        }
    }
}

fn collection(segment: &str) -> AppResult<ProjectCollection> {
    ProjectCollection::from_segment(segment).ok_or(AppError::NotFound)
}

fn empty_list(status: StatusCode) -> Response {
    (
        status,
        Json(ProjectListResponse {
            items: vec![],
            total: 0,
        }),
    )
        .into_response()
}

/// GET /api/projects/{collection}
/// Newest first. Without a reachable store the list is empty with a 503.
pub async fn list(State(state): State<AppState>, Path(segment): Path<String>) -> AppResult<Response> {
    let collection = collection(&segment)?;
    let Some(store) = state.read_store() else {
        return Ok(empty_list(StatusCode::SERVICE_UNAVAILABLE));
    };

    match list_projects(store, collection).await {
        Ok(items) => Ok(Json(ProjectListResponse {
            total: items.len(),
            items,
        })
        .into_response()),
        Err(StoreError::Unavailable(reason)) => {
            tracing::warn!(collection = %collection, reason = %reason, "project list unavailable");
            Ok(empty_list(StatusCode::SERVICE_UNAVAILABLE))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/admin/projects/{collection}/{id}
/// `new` yields an empty template; an unknown id is a 404 with a redirect
/// back to the list view.
pub async fn get_for_edit(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> AppResult<Json<Project>> {
    let collection = collection(&segment)?;
    let target = EditorTarget::parse(Some(id.as_str()));
    let editor = match target {
        EditorTarget::New => ProjectEditor::new_draft(collection),
        existing => ProjectEditor::load(state.store()?, collection, existing).await?,
    };
    Ok(Json(editor.into_project()))
}

/// POST /api/admin/projects/{collection}
pub async fn create(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(draft): Json<Project>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let collection = collection(&segment)?;
    let store = state.store()?;

    let mut editor = ProjectEditor::new_draft(collection);
    editor.apply_draft(draft);
    editor.save(store, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(editor.into_project())))
}

/// PUT /api/admin/projects/{collection}/{id}
pub async fn update(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    Json(draft): Json<Project>,
) -> AppResult<Json<Project>> {
    let collection = collection(&segment)?;
    let store = state.store()?;

    let target = match EditorTarget::parse(Some(id.as_str())) {
        EditorTarget::New => {
            return Err(AppError::BadRequest(
                "Use POST to create a project".to_string(),
            ))
        }
        existing => existing,
    };

    let mut editor = ProjectEditor::load(store, collection, target).await?;
    editor.apply_draft(draft);
    editor.save(store, Utc::now()).await?;

    Ok(Json(editor.into_project()))
}

/// DELETE /api/admin/projects/{collection}/{id}
pub async fn remove(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let collection = collection(&segment)?;
    delete_project(state.store()?, collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/projects/import
/// Seeds empty collections from the bundled brand-design images and videos.
pub async fn import(_admin: AdminSession, State(state): State<AppState>) -> AppResult<Json<ImportResponse>> {
    let store = state.store()?;
    let brand_images = state.catalog.brand_design_images().await;
    let videos = state.catalog.videos().await.map_err(|e| {
        tracing::error!("Error reading video directory: {}", e);
        AppError::Internal("Failed to read videos".to_string())
    })?;

    let report = import_from_static(store, &brand_images, &videos, Utc::now()).await?;
    tracing::info!(
        projects = report.projects,
        visual_productions = report.visual_productions,
        "static import finished"
    );
    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use crate::routes::test_support::{admin_request, get, send};
    use crate::state::test_support::state_in;
    use crate::store::{ContentStore, MemoryStore, SharedStore, PROJECTS};
    use axum::routing::{get as get_route, post};
    use axum::Router;
    use serde_json::json;
    use std::sync::Arc;

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/api/projects/{collection}", get_route(list))
            .route("/api/admin/projects/import", post(import))
            .route("/api/admin/projects/{collection}", post(create))
            .route(
                "/api/admin/projects/{collection}/{id}",
                get_route(get_for_edit).put(update).delete(remove),
            )
            .with_state(state)
    }

    fn memory_state(dir: &std::path::Path) -> (AppState, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        let store: SharedStore = memory.clone();
        (state_in(dir, Some(store)), memory)
    }

    fn json_body(value: serde_json::Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    #[tokio::test]
    async fn list_without_store_is_empty_503() {
        let dir = tempfile::tempdir().unwrap();
        let (status, bytes) = send(router(state_in(dir.path(), None)), get("/api/projects/projects")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body: ProjectListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.total, 0);
    }

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = memory_state(dir.path());
        let (status, _) = send(router(state), get("/api/projects/blog")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_then_edit_through_tab_alias() {
        let dir = tempfile::tempdir().unwrap();
        let (state, memory) = memory_state(dir.path());

        let (status, bytes) = send(
            router(state.clone()),
            admin_request(
                "POST",
                "/api/admin/projects/showcase",
                "application/json",
                json_body(json!({ "title": "Gridhaus", "brandCategories": ["Sports & Lifestyle"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Project = serde_json::from_slice(&bytes).unwrap();
        assert!(!created.id.is_empty());
        let created_at = created.created_at.unwrap();

        let (status, bytes) = send(
            router(state.clone()),
            admin_request(
                "PUT",
                &format!("/api/admin/projects/projects/{}", created.id),
                "application/json",
                json_body(json!({ "title": "Gridhaus FC" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: Project = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(updated.title, "Gridhaus FC");
        assert_eq!(updated.created_at, Some(created_at));

        let stored = memory.get(PROJECTS, &created.id).await.unwrap().unwrap();
        assert_eq!(stored.data["code"], "Gridhaus FC");

        let (status, bytes) = send(router(state), get("/api/projects/projects")).await;
        assert_eq!(status, StatusCode::OK);
        let list: ProjectListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(list.total, 1);
    }

    #[tokio::test]
    async fn blank_title_is_unprocessable_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let (state, memory) = memory_state(dir.path());
        let (status, bytes) = send(
            router(state),
            admin_request(
                "POST",
                "/api/admin/projects/projects",
                "application/json",
                json_body(json!({ "title": "" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Project Title is required");
        assert_eq!(memory.write_count(), 0);
    }

    #[tokio::test]
    async fn missing_project_redirects_to_list() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = memory_state(dir.path());
        let (status, bytes) = send(
            router(state),
            admin_request("GET", "/api/admin/projects/visuals/ghost", "application/json", Vec::new()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.redirect.as_deref(), Some("/admin/portfolio"));
    }

    #[tokio::test]
    async fn new_id_returns_template() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = memory_state(dir.path());
        let (status, bytes) = send(
            router(state),
            admin_request("GET", "/api/admin/projects/projects/new", "application/json", Vec::new()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let project: Project = serde_json::from_slice(&bytes).unwrap();
        assert!(project.id.is_empty());
        assert_eq!(project.title, "");
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let dir = tempfile::tempdir().unwrap();
        let (state, memory) = memory_state(dir.path());
        memory.set(PROJECTS, "p1", json!({ "title": "Old" })).await.unwrap();

        let (status, _) = send(
            router(state),
            admin_request("DELETE", "/api/admin/projects/projects/p1", "application/json", Vec::new()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(memory.get(PROJECTS, "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_seeds_from_static_catalog_once() {
        let dir = tempfile::tempdir().unwrap();
        for rel in [
            "public/assets/card/branddesign/Gridhaus.png",
            "public/assets/card/branddesign/Atelier Jolie.png",
            "public/assets/video/reel.mp4",
        ] {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"x").unwrap();
        }
        let (state, _) = memory_state(dir.path());

        let import = || admin_request("POST", "/api/admin/projects/import", "application/json", Vec::new());

        let (status, bytes) = send(router(state.clone()), import()).await;
        assert_eq!(status, StatusCode::OK);
        let first: ImportResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!((first.projects, first.visual_productions), (2, 1));

        let (_, bytes) = send(router(state), import()).await;
        let second: ImportResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(second.message, "No new items to import");
    }
}
