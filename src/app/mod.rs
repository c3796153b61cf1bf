use std::{fmt::Display, sync::Arc};

use actix_web::{HttpResponse, ResponseError};
use r2d2_redis::redis::RedisError;

use crate::auth::session::SessionStore;
use crate::database::store::{BlogStore, UserStore};

/** Holds the storage handles shared by every request handler */
pub struct AppState {
    pub blogs: Arc<dyn BlogStore>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            blogs: self.blogs.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

/** Holds the errors we will use during request processing */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest => f.write_str("Bad request"),
            AppError::Unauthorized => f.write_str("Unauthorized"),
            AppError::Forbidden => f.write_str("Forbidden"),
            AppError::NotFound => f.write_str("Not found"),
            AppError::InternalServerError => f.write_str("Internal server error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::BadRequest => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::Unauthorized => actix_web::http::StatusCode::UNAUTHORIZED,
            AppError::Forbidden => actix_web::http::StatusCode::FORBIDDEN,
            AppError::NotFound => actix_web::http::StatusCode::NOT_FOUND,
            AppError::InternalServerError => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError = self {
            log::error!("request failed with an internal error");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => AppError::BadRequest,
            _ => AppError::InternalServerError,
        }
    }
}

impl From<RedisError> for AppError {
    fn from(_: RedisError) -> Self {
        AppError::InternalServerError
    }
}

impl From<uuid::Error> for AppError {
    fn from(_: uuid::Error) -> Self {
        AppError::BadRequest
    }
}

impl std::error::Error for AppError {}
