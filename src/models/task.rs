use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::note::NoteDetails;
use super::user::PublicUser;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Pending,
    OnHold,
    InProgress,
    UnderReview,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::OnHold,
        TaskStatus::InProgress,
        TaskStatus::UnderReview,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::OnHold => "onHold",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::UnderReview => "underReview",
            TaskStatus::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.parse::<TaskStatus>().is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("status");
    error.message = Some("Invalid status".into());
    Err(error)
}

/// Input for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, message = "Task name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Task description is required"))]
    pub description: String,
}

/// Body of the status transition endpoint. Any status may follow any other.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct StatusInput {
    #[validate(
        length(min = 1, message = "Status is required"),
        custom = "validate_status"
    )]
    pub status: String,
}

impl StatusInput {
    /// Only meaningful after `validate()` succeeded.
    pub fn parsed(&self) -> Option<TaskStatus> {
        self.status.parse().ok()
    }
}

/// One entry of a task's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    pub status: TaskStatus,
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(user: Uuid, status: TaskStatus) -> Self {
        Self {
            user,
            status,
            changed_at: Utc::now(),
        }
    }
}

/// A task of a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "project")]
    pub project_id: Uuid,
    pub status: TaskStatus,
    #[sqlx(skip)]
    pub completed_by: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(input: TaskInput, project_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            project_id,
            status: TaskStatus::Pending,
            completed_by: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: TaskInput) {
        self.name = input.name.trim().to_string();
        self.description = input.description.trim().to_string();
        self.updated_at = Utc::now();
    }

    /// Sets the new status and appends the matching history entry.
    pub fn record_status(&mut self, change: StatusChange) {
        self.status = change.status;
        self.updated_at = change.changed_at;
        self.completed_by.push(change);
    }
}

/// A status history entry with the acting user resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeDetails {
    pub user: Option<PublicUser>,
    pub status: TaskStatus,
    pub changed_at: DateTime<Utc>,
}

/// A task with its history and notes, as returned by the single-task endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub project: Uuid,
    pub status: TaskStatus,
    pub completed_by: Vec<StatusChangeDetails>,
    pub notes: Vec<NoteDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDetails {
    pub fn new(
        task: Task,
        completed_by: Vec<StatusChangeDetails>,
        notes: Vec<NoteDetails>,
    ) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            project: task.project_id,
            status: task.status,
            completed_by,
            notes,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
