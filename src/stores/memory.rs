use std::{path::Path, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    error::StoreError,
    models::{attendance::AttendanceRecord, session::Session, user::UserProfile},
    stores::{AttendanceStore, SessionStore, UserDirectory},
};

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, session: &Session) -> Result<(), StoreError> {
        match self.sessions.entry(session.code.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(session.code.clone())),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(code).map(|s| s.value().clone()))
    }

    fn update(&self, session: &Session) -> Result<(), StoreError> {
        let mut existing = self
            .sessions
            .get_mut(&session.code)
            .ok_or_else(|| StoreError::NotFound(session.code.clone()))?;

        *existing = session.clone();
        Ok(())
    }

    fn active_sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

/// Attendance keyed by `(participant_id, session_code)`.
#[derive(Clone, Default)]
pub struct InMemoryAttendanceStore {
    records: Arc<DashMap<(String, String), AttendanceRecord>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn put(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let key = (record.participant_id.clone(), record.session_code.clone());

        match self.records.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "{}/{}",
                record.participant_id, record.session_code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn find(
        &self,
        participant_id: &str,
        session_code: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let key = (participant_id.to_string(), session_code.to_string());
        Ok(self.records.get(&key).map(|r| r.value().clone()))
    }

    fn count_for_session(&self, session_code: &str) -> Result<usize, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.session_code == session_code)
            .count())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<DashMap<String, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Loads a JSON array of user profiles.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let users: Vec<UserProfile> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;

        Ok(Self::with_users(users))
    }

    pub fn insert(&self, user: UserProfile) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{
        attendance::{Classification, Participant},
        session::NewSession,
        user::Role,
    };

    fn session(code: &str) -> Session {
        Session::new(
            code.into(),
            NewSession {
                owner_id: "LT001".into(),
                owner_label: "Dr. Smith".into(),
                subject_id: "CS301".into(),
                subject_label: "Database Systems".into(),
                duration_minutes: 30,
                class_type: None,
                topic: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn session_put_refuses_reused_code() {
        let store = InMemorySessionStore::new();
        let first = session("QR_1");

        store.put(&first).unwrap();
        let err = store.put(&session("QR_1")).unwrap_err();

        assert_eq!(err, StoreError::Conflict("QR_1".into()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn session_update_requires_existing_code() {
        let store = InMemorySessionStore::new();
        let mut s = session("QR_2");

        assert_eq!(
            store.update(&s).unwrap_err(),
            StoreError::NotFound("QR_2".into())
        );

        store.put(&s).unwrap();
        s.active = false;
        store.update(&s).unwrap();

        assert!(!store.get_by_code("QR_2").unwrap().unwrap().active);
        assert!(store.active_sessions().unwrap().is_empty());
    }

    #[test]
    fn attendance_pair_is_unique() {
        let store = InMemoryAttendanceStore::new();
        let s = session("QR_3");
        let alice = Participant {
            id: "ST001".into(),
            label: "Alice".into(),
        };
        let bob = Participant {
            id: "ST002".into(),
            label: "Bob".into(),
        };

        let record = AttendanceRecord::accepted(&alice, &s, Utc::now(), Classification::OnTime);
        store.put(&record).unwrap();

        let again = AttendanceRecord::accepted(&alice, &s, Utc::now(), Classification::Late);
        assert!(matches!(store.put(&again), Err(StoreError::Conflict(_))));

        let other = AttendanceRecord::accepted(&bob, &s, Utc::now(), Classification::OnTime);
        store.put(&other).unwrap();

        assert_eq!(store.find("ST001", "QR_3").unwrap(), Some(record));
        assert_eq!(store.count_for_session("QR_3").unwrap(), 2);
        assert_eq!(store.find("ST001", "QR_X").unwrap(), None);
    }

    #[test]
    fn directory_parses_seed_json() {
        let users: Vec<UserProfile> = serde_json::from_str(
            r#"[{"id":"ST001","name":"Alice","role":"student"},
                {"id":"LT001","name":"Dr. Smith","role":"lecturer"}]"#,
        )
        .unwrap();
        let directory = InMemoryUserDirectory::with_users(users);

        assert_eq!(directory.len(), 2);
        let lecturer = directory.find("LT001").unwrap().unwrap();
        assert_eq!(lecturer.role, Role::Lecturer);
        assert!(directory.find("nobody").unwrap().is_none());
    }
}
