use axum::{extract::Request, middleware::Next, response::Response};

/// Log every incoming request path
pub async fn log_requests(request: Request, next: Next) -> Response {
    tracing::info!(
        method = %request.method(),
        path = %request.uri().path(),
        "Incoming request"
    );
    next.run(request).await
}
