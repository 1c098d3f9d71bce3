use axum::{
    Json,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::{models::responses::ApiResponse, utils::rate_limiter::RateLimiter};

pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = req.extensions().get::<RateLimiter>() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let client_key = rate_limiter.get_client_key(&addr);

    if !rate_limiter.check_rate_limit(&client_key) {
        tracing::debug!("Rate limit exceeded for {}", client_key);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::rejection("Rate limit exceeded", "rate_limited", 429)),
        )
            .into_response();
    }

    next.run(req).await
}
