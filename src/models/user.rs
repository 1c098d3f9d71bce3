use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    Admin,
}

/// A directory entry as seen by the core. Credentials never reach this type.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub role: Role,
}
