//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Note, Project, StatusChange, Task, Token, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tokens: Vec<Token>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    notes: Vec<Note>,
}

/// Store kept entirely in process memory. All collections sit behind one lock, so every
/// trait method is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::InternalServerError("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::InternalServerError("in-memory store lock poisoned".into()))
    }

    /// All tokens issued to a user, oldest first (for tests and inspection)
    pub fn tokens_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Token>> {
        Ok(self
            .read()?
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Overwrite a token's creation time (for testing expiry)
    pub fn set_token_created_at(&self, token_id: Uuid, created_at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.tokens.iter_mut().find(|t| t.id == token_id) {
            Some(token) => {
                token.created_at = created_at;
                Ok(())
            }
            None => Err(AppError::NotFound("Token not found".into())),
        }
    }

    pub fn user_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.users.len())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let normalized = normalize_email(email);
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == normalized)
            .cloned())
    }

    async fn create_user_with_token(&self, user: &User, token: &Token) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("The user is already registered".into()));
        }
        tables.users.insert(user.id, user.clone());
        tables.tokens.push(token.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(AppError::Conflict("That email is already registered".into()));
        }
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("User not found".into())),
        }
    }

    async fn insert_token(&self, token: &Token) -> StoreResult<()> {
        self.write()?.tokens.push(token.clone());
        Ok(())
    }

    /// On a code collision the most recently issued token wins.
    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>> {
        Ok(self
            .read()?
            .tokens
            .iter()
            .filter(|t| t.token == token)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn delete_token(&self, id: Uuid) -> StoreResult<()> {
        self.write()?.tokens.retain(|t| t.id != id);
        Ok(())
    }

    async fn consume_token(&self, token: &Token, user: &User) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.users.get_mut(&user.id) {
            Some(existing) => *existing = user.clone(),
            None => return Err(AppError::NotFound("User not found".into())),
        }
        tables.tokens.retain(|t| t.id != token.id);
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        self.write()?.projects.push(project.clone());
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.read()?.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(self
            .read()?
            .projects
            .iter()
            .filter(|p| p.is_member(user_id))
            .cloned()
            .collect())
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        let mut tables = self.write()?;
        let existing = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        existing.project_name = project.project_name.clone();
        existing.client_name = project.client_name.clone();
        existing.description = project.description.clone();
        existing.updated_at = project.updated_at;
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<(u64, u64)> {
        let mut tables = self.write()?;
        let task_ids: Vec<Uuid> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == id)
            .map(|t| t.id)
            .collect();
        let notes_before = tables.notes.len();
        tables.notes.retain(|n| !task_ids.contains(&n.task_id));
        let notes = (notes_before - tables.notes.len()) as u64;
        tables.tasks.retain(|t| t.project_id != id);
        tables.projects.retain(|p| p.id != id);
        Ok((task_ids.len() as u64, notes))
    }

    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        if !project.team.contains(&user_id) {
            project.team.push(user_id);
        }
        Ok(())
    }

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        if let Some(project) = tables.projects.iter_mut().find(|p| p.id == project_id) {
            project.team.retain(|id| *id != user_id);
        }
        Ok(())
    }

    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        self.write()?.tasks.push(task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self
            .read()?
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut tables = self.write()?;
        let existing = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        existing.name = task.name.clone();
        existing.description = task.description.clone();
        existing.updated_at = task.updated_at;
        Ok(())
    }

    async fn record_status_change(&self, task_id: Uuid, change: &StatusChange) -> StoreResult<()> {
        let mut tables = self.write()?;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        task.record_status(change.clone());
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let before = tables.notes.len();
        tables.notes.retain(|n| n.task_id != id);
        let notes = (before - tables.notes.len()) as u64;
        tables.tasks.retain(|t| t.id != id);
        Ok(notes)
    }

    async fn insert_note(&self, note: &Note) -> StoreResult<()> {
        self.write()?.notes.push(note.clone());
        Ok(())
    }

    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(self.read()?.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn notes_for_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>> {
        Ok(self
            .read()?
            .notes
            .iter()
            .filter(|n| n.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        self.write()?.notes.retain(|n| n.id != id);
        Ok(())
    }
}
