//! Admin Task Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }
}

/// A to-do on the admin board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl AdminTask {
    pub fn new(title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title,
            status: TaskStatus::Pending,
            created_at: now,
        }
    }
}

impl Entity for AdminTask {
    const COLLECTION: CollectionKey = CollectionKey::Tasks;
    type Patch = TaskPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskPatch {
    Title(String),
    Status(TaskStatus),
    Toggle,
}

impl ApplyPatch<AdminTask> for TaskPatch {
    fn apply(self, target: &mut AdminTask) {
        match self {
            TaskPatch::Title(title) => target.title = title,
            TaskPatch::Status(status) => target.status = status,
            TaskPatch::Toggle => target.status = target.status.toggled(),
        }
    }
}
