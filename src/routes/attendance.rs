use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    app::api::AppContext,
    error::AppError,
    models::{requests::ScanRequest, responses::ApiResponse},
};

#[utoipa::path(
    post,
    path = "/attendance/scan",
    tag = "Attendance",
    request_body = ScanRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = ApiResponse),
        (status = 400, description = "Malformed QR payload or scan time out of range", body = ApiResponse),
        (status = 404, description = "Unknown session or participant", body = ApiResponse),
        (status = 409, description = "Attendance already recorded", body = ApiResponse),
        (status = 410, description = "Session expired", body = ApiResponse)
    )
)]
pub async fn scan_attendance(
    State(context): State<AppContext>,
    Json(req): Json<ScanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = context.state.record_scan(req)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Attendance recorded successfully",
            json!({ "attendance": record }),
        )),
    ))
}
