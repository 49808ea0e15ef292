//! Portfolio CMS - library for app logic and testing

pub mod assets;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod media;
pub mod portfolio;
pub mod routes;
pub mod state;
pub mod store;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{AppConfig, StoreBackend};
use crate::state::AppState;
use crate::store::{MemoryStore, PgDocumentStore, SharedStore};

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local dev frontend.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/pages/{key}", get(routes::content::get_page))
        .route("/api/settings", get(routes::content::get_settings))
        .route("/api/projects/{collection}", get(routes::projects::list))
        .route("/api/brand-design-images", get(routes::catalog::brand_design_images))
        .route(
            "/api/visual-production-images",
            get(routes::catalog::visual_production_images),
        )
        .route(
            "/api/visual-production-videos",
            get(routes::catalog::visual_production_videos),
        )
        .route("/api/company-logos", get(routes::catalog::company_logos))
        .route("/api/admin/pages/{key}", put(routes::content::update_page))
        .route(
            "/api/admin/pages/{key}/field",
            post(routes::content::edit_page_field),
        )
        .route(
            "/api/admin/pages/{key}/profile-image",
            post(routes::content::upload_profile_image),
        )
        .route("/api/admin/settings", put(routes::content::update_settings))
        .route("/api/admin/projects/import", post(routes::projects::import))
        .route("/api/admin/projects/{collection}", post(routes::projects::create))
        .route(
            "/api/admin/projects/{collection}/{id}",
            get(routes::projects::get_for_edit)
                .put(routes::projects::update)
                .delete(routes::projects::remove),
        )
        .route("/api/admin/media/gallery", post(routes::media::add_to_gallery))
        .route(
            "/api/admin/media/gallery/remove",
            post(routes::media::remove_from_gallery),
        )
        .route(
            "/api/admin/media/gallery/cover",
            post(routes::media::set_gallery_cover),
        )
        .route("/api/admin/media/tools", post(routes::media::upload_tool_icon))
        .route("/api/admin/media/tools/toggle", post(routes::media::toggle_tool))
        .route("/api/admin/uploads", post(routes::media::upload_file))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/store", get(routes::health::health_store))
        .route("/health/ready", get(routes::health::health_ready))
        .nest_service("/media", ServeDir::new(&config.media_root))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Multipart uploads are bounded by the request cap, not axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_request_bytes))
        .layer(cors)
}

/// Connects the configured content store. Failures fall back to running
/// without one: public pages render defaults and admin saves answer 503.
pub async fn connect_store(backend: StoreBackend) -> Option<SharedStore> {
    match backend {
        StoreBackend::Disabled => {
            tracing::info!("No content store configured. Serving defaults only.");
            None
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory content store. Edits are lost on restart.");
            Some(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => match db::init_pool(None).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                    return None;
                }
                Some(Arc::new(PgDocumentStore::new(pool)))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without content store.",
                    e
                );
                None
            }
        },
    }
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Dropping the guards stops the background writers and loses buffered lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let config = AppConfig::default();

    if config.is_production() {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == routes::auth::DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }

        let password_set =
            std::env::var("ADMIN_HASH_PASSWORD").is_ok() || std::env::var("ADMIN_PASSWORD").is_ok();
        if !password_set {
            tracing::warn!(
                "SECURITY: Neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set. \
                 The fallback default password 'admin123' is insecure. \
                 Set ADMIN_HASH_PASSWORD to a bcrypt hash of a strong password."
            );
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.media_root).await {
        tracing::warn!(
            "Cannot create media directory {}: {}",
            config.media_root.display(),
            e
        );
    }

    let store = connect_store(config.store_backend).await;
    let state = AppState::new(&config, store);
    let app = create_app(state, &config);

    let addr = config.bind_addr().expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
