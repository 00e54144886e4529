use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated user, resolved from the session token verified by `AuthMiddleware`.
///
/// Handlers take this as an argument instead of reading user data off the request, so
/// every operation that needs a caller states it in its signature. Fails with 401 when
/// the middleware did not run or the user no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".into())
            })?;
            match state.store.find_user_by_id(claims.sub).await? {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(AppError::Unauthorized("Invalid token".into()).into()),
            }
        })
    }
}

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}
