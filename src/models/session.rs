use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_CLASS_TYPE: &str = "lecture";

/// Everything needed to open a session, resolved before a code is drawn.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub owner_id: String,
    pub owner_label: String,
    pub subject_id: String,
    pub subject_label: String,
    pub duration_minutes: i64,
    pub class_type: Option<String>,
    pub topic: Option<String>,
}

/// One time-boxed attendance window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub code: String,
    pub subject_id: String,
    pub subject_label: String,
    pub owner_id: String,
    pub owner_label: String,
    pub class_type: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

impl Session {
    pub fn new(code: String, input: NewSession, now: DateTime<Utc>) -> Self {
        Self {
            code,
            subject_id: input.subject_id,
            subject_label: input.subject_label,
            owner_id: input.owner_id,
            owner_label: input.owner_label,
            class_type: input
                .class_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CLASS_TYPE.to_string()),
            topic: input.topic.unwrap_or_default(),
            created_at: now,
            duration_minutes: input.duration_minutes,
            expires_at: now + Duration::minutes(input.duration_minutes),
            active: true,
        }
    }

    /// A session accepts scans only while active and strictly before expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }

    pub fn is_time_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn code_payload(&self) -> CodePayload {
        CodePayload {
            session_code: self.code.clone(),
            unit_name: self.subject_label.clone(),
            unit_code: self.subject_id.clone(),
            class_type: self.class_type.clone(),
            topic: self.topic.clone(),
            lecturer_id: self.owner_id.clone(),
            lecturer_name: self.owner_label.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            duration: self.duration_minutes,
        }
    }
}

/// The record distributed to participants, typically rendered as a QR code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodePayload {
    pub session_code: String,
    pub unit_name: String,
    pub unit_code: String,
    pub class_type: String,
    pub topic: String,
    pub lecturer_id: String,
    pub lecturer_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub duration: i64,
}
