use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Probes hit these every few seconds; they are logged at debug only.
fn is_probe(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

fn is_admin(path: &str) -> bool {
    path.starts_with("/api/admin/")
}

/// Logs one line per request with its id, outcome and duration.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let req_id: String = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    let admin = is_admin(&path);

    match status {
        s if s.is_server_error() => tracing::error!(
            request_id = %req_id,
            method = %method,
            path = %path,
            status = %s,
            duration_ms,
            admin,
            "request failed"
        ),
        s if s == StatusCode::UNAUTHORIZED && admin => tracing::warn!(
            request_id = %req_id,
            method = %method,
            path = %path,
            duration_ms,
            "admin request without valid token"
        ),
        s if s.is_client_error() => tracing::warn!(
            request_id = %req_id,
            method = %method,
            path = %path,
            status = %s,
            duration_ms,
            admin,
            "request rejected"
        ),
        s if is_probe(&path) => tracing::debug!(
            request_id = %req_id,
            path = %path,
            status = %s,
            duration_ms,
            "probe"
        ),
        s => tracing::info!(
            request_id = %req_id,
            method = %method,
            path = %path,
            status = %s,
            duration_ms,
            admin,
            "request completed"
        ),
    }

    response
}

pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn classifies_paths() {
        assert!(is_probe("/health"));
        assert!(is_probe("/health/ready"));
        assert!(!is_probe("/healthz"));
        assert!(is_admin("/api/admin/settings"));
        assert!(!is_admin("/api/settings"));
    }

    #[tokio::test]
    async fn request_id_is_set_and_echoed() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(propagate_request_id_layer())
            .layer(axum::middleware::from_fn(log_request))
            .layer(request_id_layer());

        let res = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }
}
