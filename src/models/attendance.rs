use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::session::Session;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    OnTime,
    Late,
}

/// The participant on whose behalf a scan is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub label: String,
}

/// One accepted scan. Immutable once written.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub participant_id: String,
    pub participant_label: String,
    pub session_code: String,
    pub subject_id: String,
    pub subject_label: String,
    pub scan_time: DateTime<Utc>,
    pub classification: Classification,
}

impl AttendanceRecord {
    pub fn accepted(
        participant: &Participant,
        session: &Session,
        scan_time: DateTime<Utc>,
        classification: Classification,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            participant_id: participant.id.clone(),
            participant_label: participant.label.clone(),
            session_code: session.code.clone(),
            subject_id: session.subject_id.clone(),
            subject_label: session.subject_label.clone(),
            scan_time,
            classification,
        }
    }
}
