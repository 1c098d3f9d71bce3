use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{channel, Receiver, Sender};

use crate::models::{attendance::AttendanceRecord, session::CodePayload};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationReason {
    Manual,
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppEvent {
    SessionCreated {
        session: CodePayload,
    },
    SessionDeactivated {
        session_code: String,
        reason: DeactivationReason,
    },
    AttendanceRecorded {
        record: AttendanceRecord,
    },
}

#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Sender<AppEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = channel(1024);
        Self { sender }
    }

    /// Sending with no subscribers is not an error.
    pub fn broadcast(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Receiver<AppEvent> {
        self.sender.subscribe()
    }
}
