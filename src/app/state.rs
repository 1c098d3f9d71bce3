use std::sync::Arc;

use serde::Serialize;

use crate::{
    clock::Clock,
    config::AttendanceConfig,
    error::{AppError, AttendanceError, AttendanceResult},
    events::{AppEvent, DeactivationReason, EventBroadcaster},
    managers::{scan::ScanValidator, session::SessionManager},
    models::{
        attendance::{AttendanceRecord, Participant},
        requests::{CreateSessionRequest, ScanRequest},
        session::{NewSession, Session},
        user::{Role, UserProfile},
    },
    stores::{
        AttendanceStore, InMemoryAttendanceStore, InMemorySessionStore, SessionStore,
        UserDirectory,
    },
    utils::code_generator::{CodeGenerator, RandomCodeGenerator},
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub scanner: ScanValidator,
    pub attendance: Arc<dyn AttendanceStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
    pub events: EventBroadcaster,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(flatten)]
    pub session: Session,
    pub live: bool,
    pub attendance_count: usize,
}

impl AppState {
    pub fn new(
        config: &AttendanceConfig,
        session_store: Arc<dyn SessionStore>,
        attendance_store: Arc<dyn AttendanceStore>,
        directory: Arc<dyn UserDirectory>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionManager::new(session_store.clone(), codes, config.session_policy());
        let scanner = ScanValidator::new(
            session_store,
            attendance_store.clone(),
            sessions.clone(),
            clock.clone(),
            config.scan_policy(),
        );

        Self {
            sessions,
            scanner,
            attendance: attendance_store,
            directory,
            clock,
            events: EventBroadcaster::new(),
        }
    }

    /// State backed by the in-memory stores and the random code generator.
    pub fn in_memory(
        config: &AttendanceConfig,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            config,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryAttendanceStore::new()),
            directory,
            Arc::new(RandomCodeGenerator),
            clock,
        )
    }

    fn lookup_profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        self.directory
            .find(user_id)
            .map_err(AttendanceError::from)?
            .ok_or_else(|| AppError::UnknownUser(user_id.to_string()))
    }

    fn participant(profile: UserProfile) -> Participant {
        Participant {
            id: profile.id,
            label: profile.name,
        }
    }

    /// Opens a session. Only lecturers and admins may own one.
    pub fn create_session(&self, req: CreateSessionRequest) -> Result<Session, AppError> {
        let profile = self.lookup_profile(&req.owner_id)?;
        if profile.role == Role::Student {
            return Err(AppError::Forbidden(profile.id));
        }
        let owner = Self::participant(profile);

        let session = self.sessions.create(
            NewSession {
                owner_id: owner.id,
                owner_label: owner.label,
                subject_id: req.unit_code.trim().to_string(),
                subject_label: req.unit_name.trim().to_string(),
                duration_minutes: req.duration,
                class_type: req.class_type,
                topic: req.topic,
            },
            self.clock.now(),
        )?;

        self.events.broadcast(AppEvent::SessionCreated {
            session: session.code_payload(),
        });

        Ok(session)
    }

    pub fn session_status(&self, code: &str) -> Result<SessionStatus, AppError> {
        let session = self
            .sessions
            .get(code)?
            .ok_or_else(|| AttendanceError::NotFound(code.to_string()))?;
        let attendance_count = self
            .attendance
            .count_for_session(code)
            .map_err(AttendanceError::from)?;

        Ok(SessionStatus {
            live: SessionManager::is_live(&session, self.clock.now()),
            session,
            attendance_count,
        })
    }

    pub fn deactivate_session(&self, code: &str) -> Result<Session, AppError> {
        let (session, deactivated) = self.sessions.deactivate_if_active(code)?;

        if deactivated {
            self.events.broadcast(AppEvent::SessionDeactivated {
                session_code: session.code.clone(),
                reason: DeactivationReason::Manual,
            });
        }

        Ok(session)
    }

    /// Validates a scan. A client-reported time must sit within the
    /// configured skew of the server clock.
    pub fn record_scan(&self, req: ScanRequest) -> Result<AttendanceRecord, AppError> {
        let participant = Self::participant(self.lookup_profile(&req.participant_id)?);
        let now = self.clock.now();
        let scan_time = match req.scan_time {
            Some(reported) => {
                self.scanner.policy().check_reported_time(reported, now)?;
                reported
            }
            None => now,
        };

        let record = self
            .scanner
            .validate(&participant, &req.qr_code, scan_time)
            .inspect_err(|e| {
                if let AttendanceError::SessionExpired {
                    code,
                    deactivated: true,
                } = e
                {
                    self.events.broadcast(AppEvent::SessionDeactivated {
                        session_code: code.clone(),
                        reason: DeactivationReason::Expired,
                    });
                }
            })?;

        self.events.broadcast(AppEvent::AttendanceRecorded {
            record: record.clone(),
        });

        Ok(record)
    }

    pub fn sweep_expired_sessions(&self) -> AttendanceResult<Vec<String>> {
        let expired = self.sessions.sweep_expired(self.clock.now())?;

        for code in &expired {
            self.events.broadcast(AppEvent::SessionDeactivated {
                session_code: code.clone(),
                reason: DeactivationReason::Expired,
            });
        }

        Ok(expired)
    }
}
