//! Resolution of path-addressed projects and tasks, and the permission checks built on them.
//!
//! Each resolver returns the loaded entity so handlers pass it along explicitly.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Note, Project, Task, User};
use crate::store::Store;

/// Loads the project or fails with 404.
pub async fn project_exists(store: &dyn Store, project_id: Uuid) -> Result<Project, AppError> {
    store
        .find_project(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Loads the project if `user` is its manager or a team member. Outsiders get the same
/// 404 as for a missing project.
pub async fn member_project(
    store: &dyn Store,
    project_id: Uuid,
    user: &User,
) -> Result<Project, AppError> {
    let project = project_exists(store, project_id).await?;
    if !project.is_member(user.id) {
        return Err(AppError::NotFound("Project not found".into()));
    }
    Ok(project)
}

/// Loads the project and requires `user` to be its manager (401 otherwise).
pub async fn managed_project(
    store: &dyn Store,
    project_id: Uuid,
    user: &User,
) -> Result<Project, AppError> {
    let project = project_exists(store, project_id).await?;
    has_authorization(&project, user)?;
    Ok(project)
}

/// Only the manager may mutate a project and its tasks.
pub fn has_authorization(project: &Project, user: &User) -> Result<(), AppError> {
    if project.is_manager(user.id) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid action".into()))
    }
}

/// Loads the task or fails with 404.
pub async fn task_exists(store: &dyn Store, task_id: Uuid) -> Result<Task, AppError> {
    store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Fails with 400 when the task is not part of the project.
pub fn task_belongs_to_project(task: &Task, project: &Project) -> Result<(), AppError> {
    if task.project_id == project.id {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid action".into()))
    }
}

/// `task_exists` followed by `task_belongs_to_project`.
pub async fn project_task(
    store: &dyn Store,
    project: &Project,
    task_id: Uuid,
) -> Result<Task, AppError> {
    let task = task_exists(store, task_id).await?;
    task_belongs_to_project(&task, project)?;
    Ok(task)
}

/// A note may be deleted by its author or by the project manager.
pub fn can_delete_note(note: &Note, project: &Project, user: &User) -> Result<(), AppError> {
    if note.created_by == user.id || project.is_manager(user.id) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid action".into()))
    }
}
