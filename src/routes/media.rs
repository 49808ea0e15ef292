/**
 * Media Routes
 * Gallery editing, tool icons and plain uploads for the admin dashboard
 */
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::media::{upload, upload::project_folder, Gallery, UploadFile, UploadTarget};
use crate::portfolio::{tools, ProjectCollection};
use crate::routes::auth::AdminSession;
use crate::state::AppState;

/// Text fields and files of one multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadFile>,
}

impl UploadForm {
    /// Any part that carries a file name is a file; the rest are text fields.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::warn!("Multipart error: {}", e);
            AppError::BadRequest("Invalid multipart data".to_string())
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| AppError::BadRequest("Failed to read file data".to_string()))?;
                    form.files.push(UploadFile::new(file_name, bytes));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|_| AppError::BadRequest(format!("Failed to read field {}", name)))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Decodes a JSON-encoded text field.
    pub fn json_field<T: DeserializeOwned>(&self, name: &str) -> AppResult<Option<T>> {
        self.field(name)
            .map(|raw| {
                serde_json::from_str(raw)
                    .map_err(|e| AppError::BadRequest(format!("Invalid {} field: {}", name, e)))
            })
            .transpose()
    }

    /// The first file, for single-file endpoints.
    pub fn single_file(&self) -> AppResult<&UploadFile> {
        self.files
            .first()
            .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub gallery: Gallery,
    #[serde(default)]
    pub added: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryEdit {
    pub state: Gallery,
    pub url: String,
}

/// One entry of the tool selector grid.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolsResponse {
    pub selected: Vec<String>,
    pub available: Vec<ToolOption>,
    /// URL of the icon uploaded by this request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ToolsResponse {
    fn new(selected: Vec<String>, url: Option<String>) -> Self {
        let available = tools::available_tools(&selected)
            .into_iter()
            .map(|value| ToolOption {
                label: tools::display_name(&value),
                selected: selected.contains(&value),
                value,
            })
            .collect();
        Self {
            selected,
            available,
            url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolToggle {
    #[serde(default)]
    pub selected: Vec<String>,
    pub tool: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub target: UploadTarget,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Folder for gallery uploads: the project's own folder when the form names
/// a collection and project code, `uploads/` otherwise.
fn gallery_folder(form: &UploadForm) -> AppResult<String> {
    match (form.field("collection"), form.field("code")) {
        (Some(segment), Some(code)) => {
            let collection = ProjectCollection::from_segment(segment)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown collection: {}", segment)))?;
            Ok(project_folder(code, collection))
        }
        _ => Ok(UploadTarget::Uploads.prefix().to_string()),
    }
}

/// POST /api/admin/media/gallery
/// Multipart: `state` (gallery JSON), optional `collection` + `code`, and files.
pub async fn add_to_gallery(
    _admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<GalleryResponse>> {
    let form = UploadForm::read(multipart).await?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()));
    }
    let mut gallery: Gallery = form.json_field("state")?.unwrap_or_default();
    let folder = gallery_folder(&form)?;

    let added = gallery
        .add_files(
            state.media.as_ref(),
            &form.files,
            &folder,
            &state.upload_policy,
            state.upload_concurrency,
            Utc::now(),
        )
        .await?;

    Ok(Json(GalleryResponse { gallery, added }))
}

/// POST /api/admin/media/gallery/remove
pub async fn remove_from_gallery(
    _admin: AdminSession,
    Json(edit): Json<GalleryEdit>,
) -> AppResult<Json<GalleryResponse>> {
    let mut gallery = edit.state;
    gallery.remove(&edit.url);
    Ok(Json(GalleryResponse {
        gallery,
        added: Vec::new(),
    }))
}

/// POST /api/admin/media/gallery/cover
pub async fn set_gallery_cover(
    _admin: AdminSession,
    Json(edit): Json<GalleryEdit>,
) -> AppResult<Json<GalleryResponse>> {
    let mut gallery = edit.state;
    gallery.set_cover(&edit.url)?;
    Ok(Json(GalleryResponse {
        gallery,
        added: Vec::new(),
    }))
}

/// POST /api/admin/media/tools
/// Multipart: `selected` (JSON array) and one icon file.
pub async fn upload_tool_icon(
    _admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ToolsResponse>> {
    let form = UploadForm::read(multipart).await?;
    let mut selected: Vec<String> = form.json_field("selected")?.unwrap_or_default();
    let file = form.single_file()?;

    let url = tools::add_custom_tool(
        state.media.as_ref(),
        &mut selected,
        file,
        &state.upload_policy,
        Utc::now(),
    )
    .await?;

    Ok(Json(ToolsResponse::new(selected, Some(url))))
}

/// POST /api/admin/media/tools/toggle
/// Selects or deselects one tool in the posted selection.
pub async fn toggle_tool(_admin: AdminSession, Json(edit): Json<ToolToggle>) -> Json<ToolsResponse> {
    let mut selected = edit.selected;
    tools::toggle(&mut selected, &edit.tool);
    Json(ToolsResponse::new(selected, None))
}

/// POST /api/admin/uploads?target=uploads|profile|tools
pub async fn upload_file(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let form = UploadForm::read(multipart).await?;
    let file = form.single_file()?;
    let url = upload(
        state.media.as_ref(),
        file,
        query.target.prefix(),
        &state.upload_policy,
        Utc::now(),
    )
    .await?;
    Ok(Json(UploadResponse { url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_request, multipart_body, send, Part};
    use crate::state::test_support::state_in;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/gallery", post(add_to_gallery))
            .route("/gallery/remove", post(remove_from_gallery))
            .route("/gallery/cover", post(set_gallery_cover))
            .route("/tools", post(upload_tool_icon))
            .route("/tools/toggle", post(toggle_tool))
            .route("/uploads", post(upload_file))
            .with_state(state)
    }

    #[tokio::test]
    async fn gallery_upload_appends_in_order_into_project_folder() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_in(dir.path(), None));
        let (content_type, body) = multipart_body(&[
            Part::text("state", &json!({ "thumbnailUrl": "", "galleryUrls": [] }).to_string()),
            Part::text("collection", "showcase"),
            Part::text("code", "Atelier Jolie"),
            Part::file("files", "one.png", b"1"),
            Part::file("files", "two.png", b"2"),
        ]);

        let (status, bytes) = send(app, admin_request("POST", "/gallery", &content_type, body)).await;
        assert_eq!(status, StatusCode::OK);
        let res: GalleryResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(res.added.len(), 2);
        assert!(res.added[0].starts_with("/media/projects/atelier-jolie/portfolio/"));
        assert!(res.added[0].ends_with("_one.png"));
        assert!(res.added[1].ends_with("_two.png"));
        assert_eq!(res.gallery.thumbnail_url, res.added[0]);
        assert_eq!(res.gallery.gallery_urls, res.added);
    }

    #[tokio::test]
    async fn gallery_upload_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_in(dir.path(), None));
        let (content_type, body) = multipart_body(&[Part::file("files", "one.png", b"1")]);
        let req = axum::http::Request::post("/gallery")
            .header("content-type", content_type)
            .body(axum::body::Body::from(body))
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn remove_and_cover_edit_the_posted_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = json!({ "thumbnailUrl": "A", "galleryUrls": ["A", "B"] });

        let body = json!({ "state": state, "url": "A" }).to_string();
        let (status, bytes) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/gallery/remove", "application/json", body.into_bytes()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: GalleryResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(res.gallery, Gallery::new("B", vec!["B".to_string()]));

        let body = json!({ "state": state, "url": "Z" }).to_string();
        let (status, _) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/gallery/cover", "application/json", body.into_bytes()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tool_icon_upload_extends_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (content_type, body) = multipart_body(&[
            Part::text("selected", r#"["figma.png"]"#),
            Part::file("file", "rive.svg", b"<svg/>"),
        ]);

        let (status, bytes) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/tools", &content_type, body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: ToolsResponse = serde_json::from_slice(&bytes).unwrap();
        let url = res.url.unwrap();
        assert_eq!(res.selected.len(), 2);
        assert_eq!(res.selected[1], url);
        assert!(url.starts_with("/media/tools/"));
        assert_eq!(res.available.len(), tools::PRESET_TOOLS.len() + 1);
        let custom = res.available.last().unwrap();
        assert_eq!(custom.value, url);
        assert!(custom.selected);
    }

    #[tokio::test]
    async fn toggling_a_tool_flips_its_selection() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({ "selected": ["figma.png", "blender.png"], "tool": "figma.png" }).to_string();
        let (status, bytes) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/tools/toggle", "application/json", body.into_bytes()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: ToolsResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(res.selected, vec!["blender.png"]);
        assert!(res.url.is_none());

        let illustrator = res
            .available
            .iter()
            .find(|t| t.value == "adobe illustrator.png")
            .unwrap();
        assert_eq!(illustrator.label, "adobe illustrator");
        assert!(!illustrator.selected);
        assert!(res.available.iter().any(|t| t.value == "blender.png" && t.selected));
    }

    #[tokio::test]
    async fn plain_upload_honours_target_and_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let (content_type, body) = multipart_body(&[Part::file("file", "me.png", b"png")]);
        let (status, bytes) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/uploads?target=profile", &content_type, body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: UploadResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(res.url.starts_with("/media/profile/"));

        let big = vec![0u8; 1024 * 1024 + 1];
        let (content_type, body) = multipart_body(&[Part::file("file", "huge.png", &big)]);
        let (status, _) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/uploads", &content_type, body),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (content_type, body) = multipart_body(&[Part::text("note", "nothing here")]);
        let (status, _) = send(
            router(state_in(dir.path(), None)),
            admin_request("POST", "/uploads", &content_type, body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
