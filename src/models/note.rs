use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::user::PublicUser;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NoteInput {
    #[validate(length(min = 1, message = "Note content is required"))]
    pub content: String,
}

/// A note left on a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "task")]
    pub task_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(input: NoteInput, task_id: Uuid, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: input.content,
            task_id,
            created_by,
            created_at: Utc::now(),
        }
    }
}

/// A note with its author resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetails {
    pub id: Uuid,
    pub content: String,
    pub task: Uuid,
    pub created_by: Option<PublicUser>,
    pub created_at: DateTime<Utc>,
}

impl NoteDetails {
    pub fn new(note: Note, created_by: Option<PublicUser>) -> Self {
        Self {
            id: note.id,
            content: note.content,
            task: note.task_id,
            created_by,
            created_at: note.created_at,
        }
    }
}
