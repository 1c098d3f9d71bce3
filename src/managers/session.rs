use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AttendanceError, AttendanceResult, StoreError},
    models::session::{NewSession, Session},
    stores::SessionStore,
    utils::code_generator::CodeGenerator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
    pub max_code_attempts: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            min_duration_minutes: 1,
            max_duration_minutes: 120,
            max_code_attempts: 5,
        }
    }
}

/// Sole writer of session records.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    codes: Arc<dyn CodeGenerator>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        codes: Arc<dyn CodeGenerator>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            codes,
            policy,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn create(&self, input: NewSession, now: DateTime<Utc>) -> AttendanceResult<Session> {
        let SessionPolicy {
            min_duration_minutes: min,
            max_duration_minutes: max,
            max_code_attempts,
        } = self.policy;

        if !(min..=max).contains(&input.duration_minutes) {
            return Err(AttendanceError::InvalidInput(format!(
                "duration must be between {} and {} minutes, got {}",
                min, max, input.duration_minutes
            )));
        }
        if input.subject_id.trim().is_empty() || input.subject_label.trim().is_empty() {
            return Err(AttendanceError::InvalidInput(
                "unit code and unit name are required".into(),
            ));
        }

        for attempt in 1..=max_code_attempts {
            let session = Session::new(self.codes.generate(), input.clone(), now);

            match self.store.put(&session) {
                Ok(()) => {
                    tracing::info!(
                        "Session {} created for {} by {} ({} min)",
                        session.code,
                        session.subject_id,
                        session.owner_id.chars().take(8).collect::<String>(),
                        session.duration_minutes
                    );
                    return Ok(session);
                }
                Err(StoreError::Conflict(code)) => {
                    tracing::warn!(
                        "Code collision on {} (attempt {}/{}), retrying",
                        code,
                        attempt,
                        max_code_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            "Gave up allocating a session code after {} attempts",
            max_code_attempts
        );
        Err(AttendanceError::CodeGenerationExhausted(max_code_attempts))
    }

    pub fn get(&self, code: &str) -> AttendanceResult<Option<Session>> {
        Ok(self.store.get_by_code(code)?)
    }

    /// Marks a session inactive. Deactivating an inactive session is a no-op.
    pub fn deactivate(&self, code: &str) -> AttendanceResult<Session> {
        self.deactivate_if_active(code).map(|(session, _)| session)
    }

    /// Like [`deactivate`](Self::deactivate), also reporting whether this call
    /// flipped the session from active to inactive.
    pub fn deactivate_if_active(&self, code: &str) -> AttendanceResult<(Session, bool)> {
        let mut session = self
            .store
            .get_by_code(code)?
            .ok_or_else(|| AttendanceError::NotFound(code.to_string()))?;

        if !session.active {
            return Ok((session, false));
        }

        session.active = false;
        self.store.update(&session).map_err(|e| match e {
            StoreError::NotFound(code) => AttendanceError::NotFound(code),
            other => other.into(),
        })?;

        tracing::info!("Session {} deactivated", session.code);
        Ok((session, true))
    }

    pub fn is_live(session: &Session, now: DateTime<Utc>) -> bool {
        session.is_live(now)
    }

    /// Deactivates every active session whose window has closed and returns
    /// the codes it flipped. A session that fails to update is logged and
    /// left for the next sweep.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> AttendanceResult<Vec<String>> {
        let mut deactivated = Vec::new();

        for session in self.store.active_sessions()? {
            if !session.is_time_expired(now) {
                continue;
            }
            match self.deactivate_if_active(&session.code) {
                Ok((_, true)) => deactivated.push(session.code),
                Ok((_, false)) => {}
                Err(e) => {
                    tracing::error!("Failed to expire session {}: {}", session.code, e);
                }
            }
        }

        Ok(deactivated)
    }
}
