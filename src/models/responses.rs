use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ApiResponse {
    success: bool,
    message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[schema(example = 200)]
    code: u32,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: { if data.is_null() { None } else { Some(data) } },
            kind: None,
            code: 200,
        }
    }

    pub fn created(message: impl Into<String>, data: Value) -> Self {
        Self {
            code: 201,
            ..Self::success(message, data)
        }
    }

    pub fn failure(message: impl Into<String>, code: u32) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            kind: None,
            code,
        }
    }

    /// A failure tagged with the error discriminant so clients can branch on it.
    pub fn rejection(message: impl Into<String>, kind: &str, code: u32) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::failure(message, code)
        }
    }
}
