use crate::{
    access::{managed_project, member_project},
    auth::CurrentUser,
    cascade,
    error::AppError,
    models::{Project, ProjectDetails, ProjectInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Creates a project managed by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Project`.
/// - `400 Bad Request`: a required field is empty.
#[post("")]
pub async fn create_project(
    state: web::Data<AppState>,
    current: CurrentUser,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let project = Project::new(body.into_inner(), current.id());
    state.store.insert_project(&project).await?;

    Ok(HttpResponse::Created().json(project))
}

/// Projects the user manages or belongs to.
#[get("")]
pub async fn get_all_projects(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let projects = state.store.projects_for_user(current.id()).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// A single project with its tasks.
///
/// ## Responses:
/// - `200 OK`: `ProjectDetails`.
/// - `404 Not Found`: no such project, or the user is neither manager nor team member.
#[get("/{id}")]
pub async fn get_project_by_id(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = member_project(&*state.store, path.into_inner(), &current.0).await?;
    let tasks = state.store.tasks_for_project(project.id).await?;
    Ok(HttpResponse::Ok().json(ProjectDetails { project, tasks }))
}

/// Updates name, client and description. Manager only.
#[put("/{project_id}")]
pub async fn update_project(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let mut project = managed_project(&*state.store, path.into_inner(), &current.0).await?;
    project.apply(body.into_inner());
    state.store.update_project(&project).await?;

    Ok(HttpResponse::Ok().json(project))
}

/// Deletes the project with all its tasks and their notes. Manager only.
#[delete("/{project_id}")]
pub async fn delete_project(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = managed_project(&*state.store, path.into_inner(), &current.0).await?;
    cascade::delete_project(&*state.store, project.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
