//! PostgreSQL storage implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Note, Project, StatusChange, Task, TaskStatus, Token, User};

const PROJECT_COLUMNS: &str = "p.id, p.project_name, p.client_name, p.description, p.manager, \
     p.created_at, p.updated_at, \
     ARRAY(SELECT pt.user_id FROM project_team pt WHERE pt.project_id = p.id ORDER BY pt.seq) AS team";

const TASK_COLUMNS: &str = "id, name, description, project_id, status, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the migrations shipped in `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }

    /// Fill `completed_by` for every task with one query.
    async fn attach_history(&self, tasks: &mut [Task]) -> StoreResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let rows = sqlx::query_as::<_, (Uuid, Uuid, TaskStatus, DateTime<Utc>)>(
            "SELECT task_id, user_id, status, changed_at FROM task_status_changes \
             WHERE task_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut history: HashMap<Uuid, Vec<StatusChange>> = HashMap::new();
        for (task_id, user, status, changed_at) in rows {
            history.entry(task_id).or_default().push(StatusChange {
                user,
                status,
                changed_at,
            });
        }
        for task in tasks.iter_mut() {
            task.completed_by = history.remove(&task.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, confirmed FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, confirmed FROM users WHERE lower(email) = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user_with_token(&self, user: &User, token: &Token) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO users (id, name, email, password, confirmed) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.confirmed)
        .execute(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO tokens (id, token, user_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(token.id)
            .bind(&token.token)
            .bind(token.user_id)
            .bind(token.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET name = $1, email = $2, password = $3, confirmed = $4 WHERE id = $5",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.confirmed)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_token(&self, token: &Token) -> StoreResult<()> {
        sqlx::query("INSERT INTO tokens (id, token, user_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(token.id)
            .bind(&token.token)
            .bind(token.user_id)
            .bind(token.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT id, token, user_id, created_at FROM tokens WHERE token = $1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn delete_token(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn consume_token(&self, token: &Token, user: &User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE users SET name = $1, email = $2, password = $3, confirmed = $4 WHERE id = $5",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.confirmed)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO projects (id, project_name, client_name, description, manager, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(project.id)
        .bind(&project.project_name)
        .bind(&project.client_name)
        .bind(&project.description)
        .bind(project.manager)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {} FROM projects p WHERE p.id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects p \
             WHERE p.manager = $1 \
                OR EXISTS (SELECT 1 FROM project_team pt WHERE pt.project_id = p.id AND pt.user_id = $1) \
             ORDER BY p.created_at",
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            "UPDATE projects SET project_name = $1, client_name = $2, description = $3, updated_at = $4 \
             WHERE id = $5",
        )
        .bind(&project.project_name)
        .bind(&project.client_name)
        .bind(&project.description)
        .bind(project.updated_at)
        .bind(project.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<(u64, u64)> {
        let mut tx = self.pool.begin().await?;
        // Row locks on the tasks keep concurrent note inserts out until commit.
        sqlx::query("SELECT id FROM tasks WHERE project_id = $1 FOR UPDATE")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        let notes = sqlx::query(
            "DELETE FROM notes WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok((tasks.rows_affected(), notes.rows_affected()))
    }

    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO project_team (project_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM project_team WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, name, description, project_id, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.project_id)
        .bind(task.status)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match task {
            Some(task) => {
                let mut tasks = [task];
                self.attach_history(&mut tasks).await?;
                let [task] = tasks;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY seq",
            TASK_COLUMNS
        );
        let mut tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_history(&mut tasks).await?;
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query("UPDATE tasks SET name = $1, description = $2, updated_at = $3 WHERE id = $4")
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.updated_at)
            .bind(task.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_status_change(&self, task_id: Uuid, change: &StatusChange) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE tasks SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(change.status)
            .bind(change.changed_at)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }
        sqlx::query(
            "INSERT INTO task_status_changes (task_id, user_id, status, changed_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(task_id)
        .bind(change.user)
        .bind(change.status)
        .bind(change.changed_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT id FROM tasks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let notes = sqlx::query("DELETE FROM notes WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(notes.rows_affected())
    }

    async fn insert_note(&self, note: &Note) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO notes (id, content, task_id, created_by, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(note.id)
        .bind(&note.content)
        .bind(note.task_id)
        .bind(note.created_by)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, content, task_id, created_by, created_at FROM notes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn notes_for_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, content, task_id, created_by, created_at FROM notes WHERE task_id = $1 ORDER BY seq",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
