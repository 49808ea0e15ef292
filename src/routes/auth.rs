/**
 * Authentication Routes
 * Single-admin login issuing JWT access tokens and rotating refresh tokens
 */
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;

use crate::error::AppError;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

lazy_static::lazy_static! {
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

    pub static ref ADMIN_USERNAME: String = std::env::var("ADMIN_USERNAME")
        .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());

    /// bcrypt hash from ADMIN_HASH_PASSWORD, else ADMIN_PASSWORD hashed at
    /// startup, else the development password "admin123".
    pub static ref ADMIN_PASSWORD_HASH: String = {
        if let Ok(hashed) = std::env::var("ADMIN_HASH_PASSWORD") {
            hashed
        } else if let Ok(plain) = std::env::var("ADMIN_PASSWORD") {
            hash(&plain, DEFAULT_COST).unwrap_or_default()
        } else {
            hash("admin123", DEFAULT_COST).unwrap_or_default()
        }
    };

    /// Refresh tokens keyed by their SHA-256 hash.
    pub static ref REFRESH_TOKENS: Arc<RwLock<HashMap<String, RefreshTokenData>>> =
        Arc::new(RwLock::new(HashMap::new()));

    /// Login attempts per IP: (window start, attempts in window).
    static ref LOGIN_ATTEMPTS: Arc<RwLock<HashMap<String, (i64, u32)>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

const RATE_LIMIT_WINDOW_SECS: i64 = 60;
const MAX_LOGIN_ATTEMPTS: u32 = 5;

const ADMIN_ROLE: &str = "ADMIN";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenData {
    pub username: String,
    pub expires_at: i64,
    pub revoked: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
}

/// Proof that the request carried a valid admin access token.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        verify_access_token(&token).map(AdminSession).map_err(|e| {
            tracing::debug!("Rejected admin token: {}", e);
            AppError::Unauthorized
        })
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<UserInfo>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(error: &str) -> Self {
        Self {
            success: false,
            user: None,
            access_token: None,
            refresh_token: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshResponse {
    fn failure(error: &str) -> Self {
        Self {
            success: false,
            access_token: None,
            refresh_token: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn generate_refresh_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 64)
}

/// Refresh tokens are only ever kept as SHA-256 digests.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn create_access_token(username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

    let claims = Claims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Counts one attempt for `ip` and reports whether it is allowed. Expired
/// windows are evicted on every call so the map tracks active IPs only.
fn register_attempt(attempts: &mut HashMap<String, (i64, u32)>, ip: &str, now: i64) -> bool {
    attempts.retain(|_, (start, _)| now - *start < RATE_LIMIT_WINDOW_SECS);

    let entry = attempts.entry(ip.to_string()).or_insert((now, 0));
    if entry.1 >= MAX_LOGIN_ATTEMPTS {
        return false;
    }
    entry.1 += 1;
    true
}

async fn check_rate_limit(ip: &str) -> bool {
    let mut attempts = LOGIN_ATTEMPTS.write().await;
    register_attempt(&mut attempts, ip, Utc::now().timestamp())
}

async fn issue_refresh_token(username: &str) -> String {
    let token = generate_refresh_token();
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    REFRESH_TOKENS.write().await.insert(
        hash_refresh_token(&token),
        RefreshTokenData {
            username: username.to_string(),
            expires_at: expires_at.timestamp(),
            revoked: false,
        },
    );
    token
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let ip = addr.ip().to_string();

    if !check_rate_limit(&ip).await {
        tracing::warn!(ip = %ip, "login rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(LoginResponse::failure("Too many requests. Please try again later.")),
        );
    }

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Username and password are required")),
        );
    }

    // bcrypt is CPU-bound; keep the async executor free.
    let password = payload.password.clone();
    let password_ok = tokio::task::spawn_blocking(move || {
        verify(&password, ADMIN_PASSWORD_HASH.as_str()).unwrap_or(false)
    })
    .await
    .unwrap_or(false);
    let username_ok = payload.username.trim() == ADMIN_USERNAME.as_str();

    if !username_ok || !password_ok {
        tracing::warn!(ip = %ip, username = %payload.username, "failed login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid credentials")),
        );
    }

    let username = ADMIN_USERNAME.clone();
    let access_token = match create_access_token(&username) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Failed to create token")),
            );
        }
    };
    let refresh_token = issue_refresh_token(&username).await;

    tracing::info!(ip = %ip, username = %username, "admin logged in");
    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            user: Some(UserInfo {
                username,
                role: ADMIN_ROLE.to_string(),
            }),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            error: None,
        }),
    )
}

/// POST /api/auth/verify
pub async fn verify_token(headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = extract_bearer_token(&headers) else {
        return Json(VerifyResponse {
            success: false,
            is_valid: false,
            user: None,
            error: Some("No authorization token provided".to_string()),
        });
    };

    match verify_access_token(&token) {
        Ok(claims) => Json(VerifyResponse {
            success: true,
            is_valid: true,
            user: Some(UserInfo {
                username: claims.sub,
                role: claims.role,
            }),
            error: None,
        }),
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            Json(VerifyResponse {
                success: false,
                is_valid: false,
                user: None,
                error: Some("Invalid or expired token".to_string()),
            })
        }
    }
}

/// POST /api/auth/refresh
/// Exchanges a refresh token for a new pair; the presented token is revoked.
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> impl IntoResponse {
    if payload.refresh_token.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RefreshResponse::failure("Refresh token is required")),
        );
    }

    let token_hash = hash_refresh_token(&payload.refresh_token);
    let now = Utc::now().timestamp();

    let username = {
        let mut tokens = REFRESH_TOKENS.write().await;
        match tokens.get_mut(&token_hash) {
            Some(data) if !data.revoked && data.expires_at > now => {
                data.revoked = true;
                Some(data.username.clone())
            }
            _ => None,
        }
    };

    let Some(username) = username else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(RefreshResponse::failure("Invalid or expired refresh token")),
        );
    };

    let access_token = match create_access_token(&username) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RefreshResponse::failure("Failed to create token")),
            );
        }
    };
    let refresh_token = issue_refresh_token(&username).await;

    (
        StatusCode::OK,
        Json(RefreshResponse {
            success: true,
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            error: None,
        }),
    )
}

/// POST /api/auth/logout
/// Revokes the given refresh token, and every refresh token of the user named
/// by a valid access token. Always succeeds.
pub async fn logout(headers: HeaderMap, payload: Option<Json<LogoutRequest>>) -> impl IntoResponse {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let mut tokens = REFRESH_TOKENS.write().await;

    if let Some(refresh_token) = payload.refresh_token {
        if let Some(data) = tokens.get_mut(&hash_refresh_token(&refresh_token)) {
            data.revoked = true;
        }
    }

    if let Some(access_token) = payload
        .access_token
        .or_else(|| extract_bearer_token(&headers))
    {
        if let Ok(claims) = verify_access_token(&access_token) {
            for data in tokens.values_mut() {
                if data.username == claims.sub {
                    data.revoked = true;
                }
            }
            tracing::info!(username = %claims.sub, "admin logged out");
        }
    }

    (StatusCode::OK, Json(LogoutResponse { success: true }))
}
