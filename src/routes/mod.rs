pub mod auth;
pub mod notes;
pub mod projects;
pub mod tasks;
pub mod team;

use actix_web::{error::JsonPayloadError, error::PathError, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::{AppError, FieldError};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(vec![FieldError::new("body", err.to_string())]).into()
}

fn path_error(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(vec![FieldError::new("path", "Invalid id")]).into()
}

/// Registers the whole API. Expects `web::Data<AppState>` to be registered on the app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api/auth")
                .service(auth::create_account)
                .service(auth::confirm_account)
                .service(auth::login)
                .service(auth::request_confirmation_code)
                .service(auth::forgot_password)
                .service(auth::validate_token)
                .service(auth::update_password_with_token)
                .service(auth::get_user)
                .service(auth::update_profile)
                .service(auth::update_current_user_password)
                .service(auth::check_password),
        )
        .service(
            web::scope("/api/projects")
                .wrap(AuthMiddleware)
                .service(projects::create_project)
                .service(projects::get_all_projects)
                .service(projects::get_project_by_id)
                .service(projects::update_project)
                .service(projects::delete_project)
                .service(tasks::create_task)
                .service(tasks::get_project_tasks)
                .service(tasks::get_task_by_id)
                .service(tasks::update_task)
                .service(tasks::delete_task)
                .service(tasks::update_status)
                .service(team::find_member_by_email)
                .service(team::get_project_team)
                .service(team::add_member_by_id)
                .service(team::remove_member_by_id)
                .service(notes::create_note)
                .service(notes::get_task_notes)
                .service(notes::delete_note),
        );
}
