use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The name of the task, unique per owner.
    /// Must be between 1 and 255 characters.
    #[validate(length(
        min = 1,
        max = 255,
        message = "Task name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// An optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Represents a task entity as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Identifier of the owning user. Never changes after creation.
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i32,
}

impl NewTask {
    /// Creates a new `NewTask` from `TaskInput` owned by `owner_id`.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        Self {
            name: input.name,
            description: input.description,
            owner_id,
        }
    }
}

/// Task as it appears in the login response and in task listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            description: task.description.clone(),
        }
    }
}

/// Full task detail including the owner's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
}

impl TaskDetail {
    pub fn new(task: Task, owner_email: impl Into<String>) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            owner: owner_email.into(),
        }
    }
}
