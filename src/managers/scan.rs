//! Scan validation.
//!
//! A scan is checked in a fixed order and the first failing check decides
//! the outcome: malformed payload, unknown session, expired session,
//! duplicate scan. Anything that survives is accepted and classified as
//! on-time or late.
//!
//! Only the injected clock may close a session. A client-reported scan time
//! decides classification, never whether the session is still open for
//! everyone else.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{
    clock::Clock,
    error::{AttendanceError, AttendanceResult, StoreError},
    managers::session::SessionManager,
    models::{
        attendance::{AttendanceRecord, Classification, Participant},
        payload::ScanPayload,
        session::Session,
    },
    stores::{AttendanceStore, SessionStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    pub lateness_threshold_minutes: i64,
    /// How far a client-reported scan time may drift from the server clock.
    pub max_clock_skew_secs: i64,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            lateness_threshold_minutes: 15,
            max_clock_skew_secs: 120,
        }
    }
}

impl ScanPolicy {
    /// Late means strictly more than the threshold after the session opened.
    pub fn classify(&self, session: &Session, scan_time: DateTime<Utc>) -> Classification {
        let elapsed = scan_time - session.created_at;
        if elapsed > Duration::minutes(self.lateness_threshold_minutes) {
            Classification::Late
        } else {
            Classification::OnTime
        }
    }

    /// Rejects reported scan times outside `now ± max_clock_skew_secs`.
    pub fn check_reported_time(
        &self,
        reported: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AttendanceResult<()> {
        let skew = Duration::seconds(self.max_clock_skew_secs);
        if reported < now - skew || reported > now + skew {
            return Err(AttendanceError::InvalidInput(format!(
                "scan time {} is more than {}s away from server time",
                reported.to_rfc3339(),
                self.max_clock_skew_secs
            )));
        }
        Ok(())
    }
}

/// Sole writer of attendance records.
#[derive(Clone)]
pub struct ScanValidator {
    sessions: Arc<dyn SessionStore>,
    attendance: Arc<dyn AttendanceStore>,
    manager: SessionManager,
    clock: Arc<dyn Clock>,
    policy: ScanPolicy,
}

impl ScanValidator {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        attendance: Arc<dyn AttendanceStore>,
        manager: SessionManager,
        clock: Arc<dyn Clock>,
        policy: ScanPolicy,
    ) -> Self {
        Self {
            sessions,
            attendance,
            manager,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    pub fn validate(
        &self,
        participant: &Participant,
        raw_payload: &Value,
        scan_time: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceRecord> {
        let payload = ScanPayload::parse(raw_payload)?;
        let code = payload.code();

        let session = self
            .sessions
            .get_by_code(code)?
            .ok_or_else(|| AttendanceError::SessionNotFound(code.to_string()))?;

        if scan_time < session.created_at {
            return Err(AttendanceError::InvalidInput(format!(
                "scan time precedes the opening of session {}",
                session.code
            )));
        }

        if session.is_time_expired(self.clock.now()) {
            let (_, deactivated) = self.manager.deactivate_if_active(&session.code)?;
            return Err(AttendanceError::SessionExpired {
                code: session.code,
                deactivated,
            });
        }

        if !SessionManager::is_live(&session, scan_time) {
            return Err(AttendanceError::SessionExpired {
                code: session.code,
                deactivated: false,
            });
        }

        if self
            .attendance
            .find(&participant.id, &session.code)?
            .is_some()
        {
            return Err(AttendanceError::DuplicateScan(session.code));
        }

        let classification = self.policy.classify(&session, scan_time);
        let record = AttendanceRecord::accepted(participant, &session, scan_time, classification);

        // The store's uniqueness constraint settles races the lookup above cannot.
        match self.attendance.put(&record) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(AttendanceError::DuplicateScan(session.code));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Attendance recorded: {} in {} ({:?})",
            participant.id.chars().take(8).collect::<String>(),
            session.code,
            classification
        );

        Ok(record)
    }
}
