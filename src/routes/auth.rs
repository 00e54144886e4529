use crate::{
    auth::{
        generate_jwt, generate_token, hash_password, verify_password, AuthMiddleware,
        ChangePasswordRequest, CheckPasswordRequest, CreateAccountRequest, CurrentUser,
        EmailRequest, LoginRequest, NewPasswordRequest, TokenPath, TokenRequest,
        UpdateProfileRequest,
    },
    error::AppError,
    mail::AuthEmail,
    models::{user::normalize_email, Token, User},
    state::AppState,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

fn invalid_token() -> AppError {
    AppError::NotFound("Invalid token".into())
}

/// Looks up a confirmation/reset token. Unknown and expired tokens are both reported as
/// invalid; expired ones are removed on the way.
async fn find_valid_token(state: &AppState, token: &str) -> Result<Token, AppError> {
    let token = state
        .store
        .find_token(token)
        .await?
        .ok_or_else(invalid_token)?;
    if token.is_expired(state.token_ttl(), Utc::now()) {
        state.store.delete_token(token.id).await?;
        return Err(invalid_token());
    }
    Ok(token)
}

async fn token_owner(state: &AppState, token: &Token) -> Result<User, AppError> {
    state
        .store
        .find_user_by_id(token.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Issues a fresh confirmation token for `user` and mails it.
async fn send_confirmation_token(state: &AppState, user: &User) -> Result<(), AppError> {
    let token = Token::new(generate_token(), user.id);
    state.store.insert_token(&token).await?;
    state.send_email(
        AuthEmail {
            email: &user.email,
            name: &user.name,
            token: &token.token,
        }
        .confirmation(state.config.frontend_base(), state.config.token_ttl_minutes),
    );
    Ok(())
}

/// Register a new, unconfirmed account and mail its confirmation code.
///
/// ## Responses:
/// - `200 OK`: account and token stored, confirmation email dispatched.
/// - `400 Bad Request`: validation failed.
/// - `409 Conflict`: the email is already registered.
#[post("/create-account")]
pub async fn create_account(
    state: web::Data<AppState>,
    body: web::Json<CreateAccountRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let body = body.into_inner();

    if state.store.find_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("The user is already registered".into()));
    }

    let password = hash_password(&body.password, state.config.bcrypt_cost)?;
    let user = User::new(body.name, &body.email, password);
    let token = Token::new(generate_token(), user.id);

    state.store.create_user_with_token(&user, &token).await?;
    log::info!("Account {} created", user.id);

    state.send_email(
        AuthEmail {
            email: &user.email,
            name: &user.name,
            token: &token.token,
        }
        .confirmation(state.config.frontend_base(), state.config.token_ttl_minutes),
    );

    Ok(HttpResponse::Ok().body("Account created, check your email to confirm it"))
}

/// Confirm an account with the emailed code. The code is consumed.
#[post("/confirm-account")]
pub async fn confirm_account(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let token = find_valid_token(&state, &body.token).await?;
    let mut user = token_owner(&state, &token).await?;
    user.confirmed = true;
    state.store.consume_token(&token, &user).await?;

    Ok(HttpResponse::Ok().body("Account confirmed successfully"))
}

/// Login user
///
/// Returns the raw session token. An unconfirmed account gets a new confirmation code
/// instead, and the request fails with 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

    if !user.confirmed {
        send_confirmation_token(&state, &user).await?;
        return Err(AppError::Unauthorized(
            "The account has not been confirmed, we sent you a new confirmation email".into(),
        ));
    }

    if !verify_password(&body.password, &user.password)? {
        return Err(AppError::Unauthorized("Incorrect password".into()));
    }

    let jwt = generate_jwt(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;
    Ok(HttpResponse::Ok().body(jwt))
}

/// Send a new confirmation code to an unconfirmed account.
#[post("/request-code")]
pub async fn request_confirmation_code(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("The user is not registered".into()))?;

    if user.confirmed {
        return Err(AppError::Forbidden("The user is already confirmed".into()));
    }

    send_confirmation_token(&state, &user).await?;
    Ok(HttpResponse::Ok().body("A new token was sent to your email"))
}

/// Start a password reset. Earlier tokens stay valid.
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("The user is not registered".into()))?;

    let token = Token::new(generate_token(), user.id);
    state.store.insert_token(&token).await?;
    state.send_email(
        AuthEmail {
            email: &user.email,
            name: &user.name,
            token: &token.token,
        }
        .password_reset(state.config.frontend_base(), state.config.token_ttl_minutes),
    );

    Ok(HttpResponse::Ok().body("Check your email for instructions"))
}

/// Check that a reset code exists without consuming it.
#[post("/validate-token")]
pub async fn validate_token(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    find_valid_token(&state, &body.token).await?;
    Ok(HttpResponse::Ok().body("Valid token, set your new password"))
}

/// Set a new password with a reset code. The code is consumed.
#[post("/update-password/{token}")]
pub async fn update_password_with_token(
    state: web::Data<AppState>,
    path: web::Path<TokenPath>,
    body: web::Json<NewPasswordRequest>,
) -> Result<impl Responder, AppError> {
    path.validate()?;
    body.validate()?;

    let token = find_valid_token(&state, &path.token).await?;
    let mut user = token_owner(&state, &token).await?;
    user.password = hash_password(&body.password, state.config.bcrypt_cost)?;
    state.store.consume_token(&token, &user).await?;

    Ok(HttpResponse::Ok().body("Password updated successfully"))
}

/// The authenticated user's public profile.
#[get("/user", wrap = "AuthMiddleware")]
pub async fn get_user(current: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(current.0.public()))
}

#[put("/profile", wrap = "AuthMiddleware")]
pub async fn update_profile(
    state: web::Data<AppState>,
    current: CurrentUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let body = body.into_inner();

    if let Some(existing) = state.store.find_user_by_email(&body.email).await? {
        if existing.id != current.id() {
            return Err(AppError::Conflict("That email is already registered".into()));
        }
    }

    let mut user = current.0;
    user.name = body.name;
    user.email = normalize_email(&body.email);
    state.store.update_user(&user).await?;

    Ok(HttpResponse::Ok().body("Profile updated successfully"))
}

#[post("/change-password", wrap = "AuthMiddleware")]
pub async fn update_current_user_password(
    state: web::Data<AppState>,
    current: CurrentUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let mut user = current.0;
    if !verify_password(&body.current_password, &user.password)? {
        return Err(AppError::Unauthorized(
            "The current password is incorrect".into(),
        ));
    }

    user.password = hash_password(&body.password, state.config.bcrypt_cost)?;
    state.store.update_user(&user).await?;

    Ok(HttpResponse::Ok().body("Password updated successfully"))
}

#[post("/check-password", wrap = "AuthMiddleware")]
pub async fn check_password(
    current: CurrentUser,
    body: web::Json<CheckPasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if !verify_password(&body.password, &current.0.password)? {
        return Err(AppError::Unauthorized("Incorrect password".into()));
    }
    Ok(HttpResponse::Ok().body("Correct password"))
}
