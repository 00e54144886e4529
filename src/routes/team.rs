use crate::{
    access::{managed_project, member_project},
    auth::{CurrentUser, EmailRequest},
    error::AppError,
    models::PublicUser,
    state::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub id: Uuid,
}

/// Looks up a user by email so the manager can invite them. Manager only.
#[post("/{project_id}/team/find")]
pub async fn find_member_by_email(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    managed_project(&*state.store, path.into_inner(), &current.0).await?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(user.public()))
}

#[get("/{project_id}/team")]
pub async fn get_project_team(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = member_project(&*state.store, path.into_inner(), &current.0).await?;

    let mut team: Vec<PublicUser> = Vec::with_capacity(project.team.len());
    for id in &project.team {
        if let Some(user) = state.store.find_user_by_id(*id).await? {
            team.push(user.public());
        }
    }
    Ok(HttpResponse::Ok().json(team))
}

/// Adds an existing user to the team. Manager only.
///
/// ## Responses:
/// - `200 OK`: member added.
/// - `404 Not Found`: no user with that id.
/// - `409 Conflict`: the user is already in the project.
#[post("/{project_id}/team")]
pub async fn add_member_by_id(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<AddMemberRequest>,
) -> Result<impl Responder, AppError> {
    let project = managed_project(&*state.store, path.into_inner(), &current.0).await?;

    let user = state
        .store
        .find_user_by_id(body.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if project.is_member(user.id) {
        return Err(AppError::Conflict(
            "The user is already part of the project".into(),
        ));
    }

    state.store.add_team_member(project.id, user.id).await?;
    Ok(HttpResponse::Ok().body("User added successfully"))
}

/// Removes a user from the team. Manager only.
#[delete("/{project_id}/team/{user_id}")]
pub async fn remove_member_by_id(
    state: web::Data<AppState>,
    current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, user_id) = path.into_inner();
    let project = managed_project(&*state.store, project_id, &current.0).await?;

    if !project.team.contains(&user_id) {
        return Err(AppError::Conflict("The user is not part of the project".into()));
    }

    state.store.remove_team_member(project.id, user_id).await?;
    Ok(HttpResponse::Ok().body("User removed successfully"))
}
