use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::responses::ApiResponse;

/// Failures reported by a session or attendance store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Discriminant of an [`AttendanceError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    MalformedInput,
    SessionNotFound,
    SessionExpired,
    DuplicateScan,
    CodeGenerationExhausted,
    StorageError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::SessionNotFound => "session_not_found",
            ErrorKind::SessionExpired => "session_expired",
            ErrorKind::DuplicateScan => "duplicate_scan",
            ErrorKind::CodeGenerationExhausted => "code_generation_exhausted",
            ErrorKind::StorageError => "storage_error",
        }
    }
}

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session {0} not found")]
    NotFound(String),

    #[error("Invalid QR code format: {0}")]
    MalformedInput(String),

    #[error("No session matches code {0}")]
    SessionNotFound(String),

    /// `deactivated` is set when this observation closed the session.
    #[error("Session {code} has expired")]
    SessionExpired { code: String, deactivated: bool },

    #[error("Attendance already recorded for session {0}")]
    DuplicateScan(String),

    #[error("Could not allocate a unique session code after {0} attempts")]
    CodeGenerationExhausted(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AttendanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::InvalidInput(_) => ErrorKind::InvalidInput,
            AttendanceError::NotFound(_) => ErrorKind::NotFound,
            AttendanceError::MalformedInput(_) => ErrorKind::MalformedInput,
            AttendanceError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            AttendanceError::SessionExpired { .. } => ErrorKind::SessionExpired,
            AttendanceError::DuplicateScan(_) => ErrorKind::DuplicateScan,
            AttendanceError::CodeGenerationExhausted(_) => ErrorKind::CodeGenerationExhausted,
            AttendanceError::Storage(_) => ErrorKind::StorageError,
        }
    }

    /// True for genuine system faults; every other kind is an expected outcome.
    pub fn is_fault(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StorageError | ErrorKind::CodeGenerationExhausted
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput | ErrorKind::MalformedInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::SessionNotFound => StatusCode::NOT_FOUND,
            ErrorKind::SessionExpired => StatusCode::GONE,
            ErrorKind::DuplicateScan => StatusCode::CONFLICT,
            ErrorKind::CodeGenerationExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AttendanceResult<T> = std::result::Result<T, AttendanceError>;

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Attendance(#[from] AttendanceError),

    #[error("User {0} not found")]
    UnknownUser(String),

    #[error("User {0} may not open attendance sessions")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::Attendance(e) => {
                if e.is_fault() {
                    tracing::error!("Request failed: {}", e);
                } else {
                    tracing::debug!("Request rejected: {}", e);
                }
                (e.status_code(), e.kind().as_str())
            }
            AppError::UnknownUser(_) => (StatusCode::NOT_FOUND, "unknown_user"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };

        let message = match &self {
            AppError::Attendance(e) if e.kind() == ErrorKind::StorageError => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ApiResponse::rejection(message, kind, status.as_u16() as u32)),
        )
            .into_response()
    }
}
