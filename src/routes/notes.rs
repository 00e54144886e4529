use crate::{
    access::{can_delete_note, member_project, project_task},
    auth::CurrentUser,
    error::AppError,
    models::{Note, NoteInput},
    state::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

#[post("/{project_id}/tasks/{task_id}/notes")]
pub async fn create_note(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<NoteInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let (project_id, task_id) = path.into_inner();
    let project = member_project(&*state.store, project_id, &current.0).await?;
    let task = project_task(&*state.store, &project, task_id).await?;

    let note = Note::new(body.into_inner(), task.id, current.id());
    state.store.insert_note(&note).await?;

    Ok(HttpResponse::Created().json(note))
}

#[get("/{project_id}/tasks/{task_id}/notes")]
pub async fn get_task_notes(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    let project = member_project(&*state.store, project_id, &current.0).await?;
    let task = project_task(&*state.store, &project, task_id).await?;

    let notes = state.store.notes_for_task(task.id).await?;
    Ok(HttpResponse::Ok().json(notes))
}

/// Deletes a note. Allowed for its author and the project manager.
#[delete("/{project_id}/tasks/{task_id}/notes/{note_id}")]
pub async fn delete_note(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id, note_id) = path.into_inner();
    let project = member_project(&*state.store, project_id, &current.0).await?;
    let task = project_task(&*state.store, &project, task_id).await?;

    let note = state
        .store
        .find_note(note_id)
        .await?
        .filter(|note| note.task_id == task.id)
        .ok_or_else(|| AppError::NotFound("Note not found".into()))?;

    can_delete_note(&note, &project, &current.0)?;
    state.store.delete_note(note.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
