use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub owner_id: String,
    pub unit_code: String,
    pub unit_name: String,
    #[schema(example = 60)]
    pub duration: i64,
    pub class_type: Option<String>,
    pub topic: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub participant_id: String,
    /// Either the payload object or its JSON-encoded string form.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub qr_code: Value,
    pub scan_time: Option<DateTime<Utc>>,
}
