//! Task kind and handle types

use serde::{Deserialize, Serialize};

use super::TaskId;

/// Which lane a task runs in
///
/// Microtasks model promise-continuation semantics: the whole microtask lane
/// drains before the next macrotask. Macrotasks model timer callbacks, ordered
/// by readiness time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Micro,
    Macro,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Micro => write!(f, "micro"),
            Self::Macro => write!(f, "macro"),
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "micro" | "microtask" => Ok(Self::Micro),
            "macro" | "macrotask" => Ok(Self::Macro),
            _ => Err(format!("Unknown task kind: {}", s)),
        }
    }
}

/// Handle returned from a submission, used to cancel a still-queued task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    id: TaskId,
    kind: TaskKind,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, kind: TaskKind) -> Self {
        Self { id, kind }
    }

    /// The task's unique ID
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// The lane this task was submitted to
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}
