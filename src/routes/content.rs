/**
 * Content Routes
 * Landing page copy and global settings: public reads, admin saves
 */
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::content::{
    load_page, load_settings, save_page, save_settings, GlobalSettings, PageContent, PageKey,
    SparseDocument,
};
use crate::error::{AppError, AppResult};
use crate::media::{upload, UploadTarget};
use crate::routes::auth::AdminSession;
use crate::routes::media::UploadForm;
use crate::state::AppState;

fn page_key(key: &str) -> AppResult<PageKey> {
    key.parse().map_err(|_| AppError::NotFound)
}

/// Drafts may be partial; missing sections and fields take their defaults.
fn decode_draft<T: SparseDocument>(draft: &Value) -> AppResult<T> {
    T::merge_with_defaults(draft).map_err(|e| AppError::Validation(format!("Invalid content: {}", e)))
}

/// GET /api/pages/{key}
/// Never fails for a known page: without a reachable store the defaults are served.
pub async fn get_page(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<PageContent>> {
    let key = page_key(&key)?;
    Ok(Json(load_page(state.read_store(), key).await))
}

/// PUT /api/admin/pages/{key}
pub async fn update_page(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(draft): Json<Value>,
) -> AppResult<Json<PageContent>> {
    let key = page_key(&key)?;
    let content: PageContent = decode_draft(&draft)?;
    save_page(state.store()?, key, &content).await?;
    Ok(Json(content))
}

/// One text edit inside the page editor.
#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    /// The editor's current draft; the stored page when absent.
    #[serde(default)]
    pub draft: Option<Value>,
    pub section: String,
    pub field: String,
    pub value: String,
}

/// POST /api/admin/pages/{key}/field
/// Applies one field edit to the draft and returns it. Nothing is saved.
pub async fn edit_page_field(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> AppResult<Json<PageContent>> {
    let key = page_key(&key)?;
    let mut draft: PageContent = match &edit.draft {
        Some(value) => decode_draft(value)?,
        None => load_page(state.read_store(), key).await,
    };
    draft.set_field(&edit.section, &edit.field, &edit.value)?;
    Ok(Json(draft))
}

/// POST /api/admin/pages/{key}/profile-image
/// Multipart: optional `draft` (page JSON) and the image file. Uploads under
/// `profile/` and returns the draft pointing at the new image. Nothing is
/// saved; the client saves the page when the editor does.
pub async fn upload_profile_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<PageContent>> {
    let key = page_key(&key)?;
    let form = UploadForm::read(multipart).await?;
    let file = form.single_file()?;

    let mut draft: PageContent = match form.json_field::<Value>("draft")? {
        Some(value) => decode_draft(&value)?,
        None => load_page(state.read_store(), key).await,
    };

    let url = upload(
        state.media.as_ref(),
        file,
        UploadTarget::Profile.prefix(),
        &state.upload_policy,
        Utc::now(),
    )
    .await?;
    draft.set_profile_image(url);

    Ok(Json(draft))
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<GlobalSettings> {
    Json(load_settings(state.read_store()).await)
}

/// PUT /api/admin/settings
pub async fn update_settings(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(draft): Json<Value>,
) -> AppResult<Json<GlobalSettings>> {
    let settings: GlobalSettings = decode_draft(&draft)?;
    save_settings(state.store()?, &settings).await?;
    tracing::info!("global settings saved");
    Ok(Json(settings))
}
