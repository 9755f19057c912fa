//! Request logging and last-resort failure handling.

use axum::{extract::Request, middleware::Next, response::Response};
use std::any::Any;
use std::time::Instant;

use crate::errors::internal_server_error;

/// Logs `METHOD path -> status (elapsed)` for every request.
///
/// Bodies are never read. Server errors are logged at error level so they carry the
/// method, path and timing next to whatever the failing layer already logged.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    if status.is_server_error() {
        tracing::error!(
            "{} {} -> {} ({:.3} s)",
            method,
            path,
            status.as_u16(),
            elapsed.as_secs_f64()
        );
    } else {
        tracing::info!(
            "{} {} -> {} ({:.3} s)",
            method,
            path,
            status.as_u16(),
            elapsed.as_secs_f64()
        );
    }

    response
}

/// Turns a handler panic into the generic 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Unhandled panic while serving request: {}", detail);

    internal_server_error()
}
