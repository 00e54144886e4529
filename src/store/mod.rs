//! Storage abstractions for users, tokens, projects, tasks and notes.
//!
//! Handlers depend only on the `Store` trait. `PgStore` is the production backend,
//! `InMemoryStore` backs the integration tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Note, Project, StatusChange, Task, Token, User};

/// Result type for store operations
pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Look up a user by id.
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Look up a user by (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Persist a new user together with its first token, atomically.
    /// Fails with `Conflict` when the email is taken.
    async fn create_user_with_token(&self, user: &User, token: &Token) -> StoreResult<()>;

    /// Overwrite name, email, password and confirmed flag.
    async fn update_user(&self, user: &User) -> StoreResult<()>;

    async fn insert_token(&self, token: &Token) -> StoreResult<()>;

    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>>;

    async fn delete_token(&self, id: Uuid) -> StoreResult<()>;

    /// Save `user` and delete `token` in one step; used by confirmation and password reset.
    async fn consume_token(&self, token: &Token, user: &User) -> StoreResult<()>;

    async fn insert_project(&self, project: &Project) -> StoreResult<()>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects where the user is manager or team member.
    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    /// Overwrite name, client and description.
    async fn update_project(&self, project: &Project) -> StoreResult<()>;

    /// Remove the project together with its tasks and their notes, atomically.
    /// Returns the number of tasks and notes removed.
    async fn delete_project(&self, id: Uuid) -> StoreResult<(u64, u64)>;

    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    async fn insert_task(&self, task: &Task) -> StoreResult<()>;

    /// Look up a task, including its status history.
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks of a project in creation order.
    async fn tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Overwrite name and description.
    async fn update_task(&self, task: &Task) -> StoreResult<()>;

    /// Set the task status and append `change` to its history.
    async fn record_status_change(&self, task_id: Uuid, change: &StatusChange) -> StoreResult<()>;

    /// Remove the task together with its notes, atomically. Returns the number of notes
    /// removed.
    async fn delete_task(&self, id: Uuid) -> StoreResult<u64>;

    async fn insert_note(&self, note: &Note) -> StoreResult<()>;

    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>>;

    /// Notes of a task in creation order.
    async fn notes_for_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>>;

    async fn delete_note(&self, id: Uuid) -> StoreResult<()>;
}
