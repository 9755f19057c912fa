use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::FieldError;
use crate::handlers::{self, AppState, HealthResponse};
use crate::lead_models::{CreateLeadRequest, LeadListResponse, LeadResponse, UpdateLeadRequest};
use crate::middleware::{handle_panic, log_requests};

/// Request bodies above this size are refused before reaching a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::create_lead,
        handlers::list_leads,
        handlers::get_lead,
        handlers::replace_lead,
        handlers::update_lead,
        handlers::delete_lead,
    ),
    components(schemas(
        CreateLeadRequest,
        UpdateLeadRequest,
        LeadResponse,
        LeadListResponse,
        HealthResponse,
        FieldError,
    )),
    tags(
        (name = "leads", description = "Lead CRUD"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Assembles the full HTTP application.
///
/// Lead routes sit behind the body limit and, when configured, the per-IP rate limiter.
/// Health and docs bypass both.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let mut lead_routes = Router::new()
        .route(
            "/api/v1/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .route(
            "/api/v1/leads/:id",
            get(handlers::get_lead)
                .put(handlers::replace_lead)
                .patch(handlers::update_lead)
                .delete(handlers::delete_lead),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    if let Some(limit) = state.config.rate_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_millisecond(limit.refill_interval_ms())
                .burst_size(limit.burst)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
        );
        lead_routes = lead_routes.layer(GovernorLayer {
            config: governor_conf,
        });
    }

    let cors = cors_layer(&state.config.allowed_origins)?;

    let app = Router::new()
        .route("/api/v1/health", get(handlers::health))
        .merge(lead_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    Ok(with_middleware(app, cors))
}

/// Outer stack shared by every route. The request log wraps the panic handler so a
/// panicking handler still gets its `METHOD path -> 500` line.
fn with_middleware(app: Router, cors: CorsLayer) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Credentials rule out wildcards, so methods and headers mirror the request
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_lead_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/leads"));
        assert!(doc.paths.paths.contains_key("/api/v1/leads/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/health"));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_generic_500() {
        use axum::{body::Body, http::Request, http::StatusCode};
        use tower::ServiceExt;

        async fn explode() -> &'static str {
            panic!("connection string postgres://user:pw@db")
        }

        let app = with_middleware(Router::new().route("/explode", get(explode)), CorsLayer::new());

        let response = app
            .oneshot(Request::builder().uri("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_cors_rejects_bad_origin() {
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
