/**
 * Catalog Routes
 * Listings of the static assets bundled with the site
 */
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::assets::{CompanyLogo, VideoAsset};
use crate::error::ErrorResponse;
use crate::state::AppState;

/// GET /api/brand-design-images
pub async fn brand_design_images(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.brand_design_images().await)
}

/// GET /api/visual-production-images
/// Not cached: the folder is edited by hand while the site is running.
pub async fn visual_production_images(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store, max-age=0")],
        Json(state.catalog.visual_production_images().await),
    )
}

/// GET /api/visual-production-videos
pub async fn visual_production_videos(
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoAsset>>, (StatusCode, Json<ErrorResponse>)> {
    state.catalog.videos().await.map(Json).map_err(|e| {
        tracing::error!("Error reading video directory: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to fetch videos")),
        )
    })
}

/// GET /api/company-logos
pub async fn company_logos(State(state): State<AppState>) -> Json<Vec<CompanyLogo>> {
    Json(state.catalog.company_logos().await)
}
