/**
 * Health Routes
 * Liveness, readiness and content-store checks
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    /// Not configured; the server runs in degraded mode.
    Disabled,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub store: ServiceCheck,
    pub static_assets: ServiceCheck,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub store: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

async fn check_store(state: &AppState) -> ServiceCheck {
    let Some(store) = state.read_store() else {
        return ServiceCheck {
            status: CheckStatus::Disabled,
            response_time: None,
            error: Some("No content store configured".to_string()),
        };
    };

    match store.ping().await {
        Ok(duration) => ServiceCheck {
            status: CheckStatus::Healthy,
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: CheckStatus::Unhealthy,
            response_time: None,
            error: Some(e.to_string()),
        },
    }
}

async fn check_static_assets(state: &AppState) -> ServiceCheck {
    let assets = state.catalog.root().join("assets");
    match tokio::fs::metadata(&assets).await {
        Ok(meta) if meta.is_dir() => ServiceCheck {
            status: CheckStatus::Healthy,
            response_time: None,
            error: None,
        },
        _ => ServiceCheck {
            status: CheckStatus::Unhealthy,
            response_time: None,
            error: Some(format!("{} is not a directory", assets.display())),
        },
    }
}

/// GET /health
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed
/// Always 200 so clients can tell the process is up even when dependencies are not.
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let response = DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        checks: HealthChecks {
            store: check_store(&state).await,
            static_assets: check_static_assets(&state).await,
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /health/store
pub async fn health_store(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(check_store(&state).await))
}

/// GET /health/ready
/// Not ready only when a store is configured but unreachable. Running without
/// a store is a supported degraded mode.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = check_store(&state).await;
    let is_ready = store.status != CheckStatus::Unhealthy;

    let response = ReadyResponse {
        status: if is_ready { "ready" } else { "not ready" }.to_string(),
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        store: store.status,
        reason: if is_ready { None } else { store.error },
    };

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
