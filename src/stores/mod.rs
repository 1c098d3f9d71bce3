//! Storage contracts the core depends on.
//!
//! Stores hold no business logic. They do enforce key uniqueness: `put`
//! must fail with [`StoreError::Conflict`] instead of overwriting, which is
//! what keeps session codes and attendance pairs unique under concurrency.

pub mod memory;

use crate::{
    error::StoreError,
    models::{attendance::AttendanceRecord, session::Session, user::UserProfile},
};

pub use memory::{InMemoryAttendanceStore, InMemorySessionStore, InMemoryUserDirectory};

pub trait SessionStore: Send + Sync {
    /// Inserts a new session. Conflicts if the code was ever issued before.
    fn put(&self, session: &Session) -> Result<(), StoreError>;

    fn get_by_code(&self, code: &str) -> Result<Option<Session>, StoreError>;

    /// Replaces an existing session. Fails with `NotFound` for unknown codes.
    fn update(&self, session: &Session) -> Result<(), StoreError>;

    fn active_sessions(&self) -> Result<Vec<Session>, StoreError>;
}

pub trait AttendanceStore: Send + Sync {
    /// Inserts a record. Conflicts if one exists for the same
    /// `(participant_id, session_code)` pair.
    fn put(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    fn find(
        &self,
        participant_id: &str,
        session_code: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    fn count_for_session(&self, session_code: &str) -> Result<usize, StoreError>;
}

/// Read-only view of the external user directory.
pub trait UserDirectory: Send + Sync {
    fn find(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
}
