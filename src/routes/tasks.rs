use std::collections::HashMap;

use crate::{
    access::{managed_project, member_project, project_task},
    auth::CurrentUser,
    cascade,
    error::AppError,
    models::{
        note::NoteDetails, task::StatusChangeDetails, PublicUser, StatusChange, StatusInput,
        Task, TaskDetails, TaskInput,
    },
    state::AppState,
    store::Store,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Public profiles for the given ids; ids of deleted users are skipped.
async fn resolve_users(
    store: &dyn Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, PublicUser>, AppError> {
    let mut users = HashMap::new();
    for id in ids {
        if users.contains_key(&id) {
            continue;
        }
        if let Some(user) = store.find_user_by_id(id).await? {
            users.insert(id, user.public());
        }
    }
    Ok(users)
}

/// Adds a task to a project. Manager only.
///
/// ## Responses:
/// - `201 Created`: the new `Task`, status `pending`.
/// - `401 Unauthorized`: the user is not the project manager.
/// - `404 Not Found`: no such project.
#[post("/{project_id}/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let project = managed_project(&*state.store, path.into_inner(), &current.0).await?;
    body.validate()?;

    let task = Task::new(body.into_inner(), project.id);
    state.store.insert_task(&task).await?;

    Ok(HttpResponse::Created().json(task))
}

#[get("/{project_id}/tasks")]
pub async fn get_project_tasks(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = member_project(&*state.store, path.into_inner(), &current.0).await?;
    let tasks = state.store.tasks_for_project(project.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// A task with its status history and notes, authors resolved.
#[get("/{project_id}/tasks/{task_id}")]
pub async fn get_task_by_id(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    let project = member_project(&*state.store, project_id, &current.0).await?;
    let task = project_task(&*state.store, &project, task_id).await?;
    let notes = state.store.notes_for_task(task.id).await?;

    let users = resolve_users(
        &*state.store,
        task.completed_by
            .iter()
            .map(|c| c.user)
            .chain(notes.iter().map(|n| n.created_by))
            .collect::<Vec<_>>(),
    )
    .await?;

    let completed_by = task
        .completed_by
        .iter()
        .map(|change| StatusChangeDetails {
            user: users.get(&change.user).cloned(),
            status: change.status,
            changed_at: change.changed_at,
        })
        .collect();
    let notes = notes
        .into_iter()
        .map(|note| {
            let author = users.get(&note.created_by).cloned();
            NoteDetails::new(note, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(TaskDetails::new(task, completed_by, notes)))
}

/// Updates name and description. Manager only.
#[put("/{project_id}/tasks/{task_id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    let project = managed_project(&*state.store, project_id, &current.0).await?;
    body.validate()?;
    let mut task = project_task(&*state.store, &project, task_id).await?;

    task.apply(body.into_inner());
    state.store.update_task(&task).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes the task and its notes. Manager only.
#[delete("/{project_id}/tasks/{task_id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    let project = managed_project(&*state.store, project_id, &current.0).await?;
    let task = project_task(&*state.store, &project, task_id).await?;

    cascade::delete_task(&*state.store, task.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Moves a task to any status and appends the change to its history.
/// Open to the manager and every team member.
#[post("/{project_id}/tasks/{task_id}/status")]
pub async fn update_status(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<StatusInput>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    body.validate()?;
    let status = body
        .parsed()
        .ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;

    let project = member_project(&*state.store, project_id, &current.0).await?;
    let mut task = project_task(&*state.store, &project, task_id).await?;

    let change = StatusChange::new(current.id(), status);
    state.store.record_status_change(task.id, &change).await?;
    task.record_status(change);

    Ok(HttpResponse::Ok().json(task))
}
