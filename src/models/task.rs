use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects titles that are empty or consist only of whitespace.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Title is required".into());
        return Err(error);
    }
    Ok(())
}

/// Input structure for creating a task.
/// A missing title deserializes to an empty string so it fails validation
/// instead of failing JSON extraction.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Required; whitespace alone does not count.
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub title: String,

    /// An optional description for the task.
    pub description: Option<String>,
}

/// Partial update of a task. Absent fields are left untouched; fields that are
/// not listed here (such as `owner_id`) are ignored.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(custom = "not_blank")]
    pub title: Option<String>,

    pub description: Option<String>,

    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who created the task. Never changes.
    pub owner_id: Uuid,
    pub title: String,
    /// Empty when the task was created without one.
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not yet completed `Task` owned by `owner_id`.
    pub fn new(input: TaskInput, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description.unwrap_or_default(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
