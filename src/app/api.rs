use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app::state::AppState,
    config::GlobalConfig,
    middleware::rate_limiter::rate_limit_middleware,
    routes::{
        attendance::scan_attendance,
        event::sse_handler,
        health::health_check,
        session::{create_session, deactivate_session, get_session},
    },
    utils::rate_limiter::RateLimiter,
};

#[derive(Clone)]
pub struct AppContext {
    pub state: AppState,
    pub config: GlobalConfig,
    pub rate_limiter: RateLimiter,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Attendance Codes API", version = "1.0.0"),
    paths(
        crate::routes::health::health_check,
        crate::routes::event::sse_handler,
        crate::routes::session::create_session,
        crate::routes::session::get_session,
        crate::routes::session::deactivate_session,
        crate::routes::attendance::scan_attendance,
    ),
    components(schemas(
        crate::models::responses::ApiResponse,
        crate::models::requests::CreateSessionRequest,
        crate::models::requests::ScanRequest,
    ))
)]
struct ApiDoc;

pub fn create_api_router(context: AppContext) -> Router {
    let origins: Vec<HeaderValue> = context
        .config
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::CACHE_CONTROL,
        ]);

    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{code}", get(get_session))
        .route("/sessions/{code}/deactivate", post(deactivate_session))
        .route("/attendance/scan", post(scan_attendance))
        .route("/events", get(sse_handler))
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(context.rate_limiter.clone()))
        .layer(cors)
        .with_state(context)
}
