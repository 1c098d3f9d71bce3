use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    error::AppError,
    models::{requests::CreateSessionRequest, responses::ApiResponse},
};

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Session",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created, returns the code payload", body = ApiResponse),
        (status = 400, description = "Duration out of range or missing unit", body = ApiResponse),
        (status = 403, description = "Owner is a student", body = ApiResponse),
        (status = 404, description = "Owner not in the user directory", body = ApiResponse),
        (status = 503, description = "No unique code could be allocated", body = ApiResponse)
    )
)]
pub async fn create_session(
    State(context): State<AppContext>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = context.state.create_session(req)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "QR code generated successfully",
            json!({ "qrCode": session.code_payload() }),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}",
    tag = "Session",
    params(("code" = String, Path, description = "Session code")),
    responses(
        (status = 200, description = "Session status", body = ApiResponse),
        (status = 404, description = "Unknown session", body = ApiResponse)
    )
)]
pub async fn get_session(
    State(context): State<AppContext>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let status = context.state.session_status(&code)?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Session fetched.", json!(status))),
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/deactivate",
    tag = "Session",
    params(("code" = String, Path, description = "Session code")),
    responses(
        (status = 200, description = "Session is inactive", body = ApiResponse),
        (status = 404, description = "Unknown session", body = ApiResponse)
    )
)]
pub async fn deactivate_session(
    State(context): State<AppContext>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = context.state.deactivate_session(&code)?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Session deactivated.",
            json!({ "sessionCode": session.code, "active": session.active }),
        )),
    ))
}
