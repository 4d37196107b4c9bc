//! Task ID generation
//!
//! All IDs use the format: `{6-char-hex}-{kind}-{order}`
//! Example: `019430-micro-42`

use serde::{Deserialize, Serialize};

use super::TaskKind;

/// Generate a task ID from kind and submission order
fn generate_id(kind: TaskKind, order: u64) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex_prefix = &uuid.to_string()[..6];
    format!("{}-{}-{}", hex_prefix, kind, order)
}

/// Task ID wrapper for type-safe ID handling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID from kind and submission order
    pub fn new(kind: TaskKind, order: u64) -> Self {
        Self(generate_id(kind, order))
    }

    /// Create from an existing ID string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the hex prefix (first 6 chars)
    pub fn hex_prefix(&self) -> &str {
        &self.0[..6]
    }

    /// Get the full ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the kind portion
    pub fn kind(&self) -> Option<&str> {
        // Format: {hex}-{kind}-{order}
        let parts: Vec<&str> = self.0.splitn(3, '-').collect();
        parts.get(1).copied()
    }

    /// Get the submission-order portion
    pub fn order(&self) -> Option<u64> {
        let parts: Vec<&str> = self.0.splitn(3, '-').collect();
        parts.get(2).and_then(|s| s.parse().ok())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
