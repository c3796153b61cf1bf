use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::app::{AppError, AppState};
use crate::auth::session::SessionStore;

/// Verified identity of the calling user, resolved from the `token`
/// cookie before the handler body runs. Handlers that take an `AuthUser`
/// never see a request without a live session; routes that merely behave
/// differently for the owner take `Option<AuthUser>` instead.
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let token = req.cookie("token").ok_or(AppError::Unauthorized)?;
    let state = req
        .app_data::<Data<AppState>>()
        .ok_or(AppError::InternalServerError)?;

    let user_id = state.sessions.find(token.value())?;

    Ok(AuthUser { user_id })
}
