use actix_web::{
    cookie::{time::OffsetDateTime, Cookie, Expiration},
    get, post,
    web::{self, Data},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sha256::digest;

use crate::{
    app::{AppError, AppState},
    auth::session::{SessionStore, SESSION_TTL_SECS},
    database::models::user::User,
    database::store::UserStore,
};

const MIN_PASSWORD_LEN: usize = 10;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

pub fn session_cookie(token: String) -> Result<Cookie<'static>, AppError> {
    let expires = OffsetDateTime::from_unix_timestamp(
        Utc::now().timestamp() + SESSION_TTL_SECS as i64,
    )
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Cookie::build("token", token)
        .path("/")
        .http_only(true)
        .expires(Expiration::DateTime(expires))
        .finish())
}

/// Pipe for checking whether a username is already taken, used by the
/// signup form while the user types
/// - url: `{domain}/api/users?username=`
///
/// # Response
/// ## Ok
/// - `{exists: bool}`
/// ## Error
/// - Bad request, when the `username` parameter is missing
#[get("/api/users")]
pub async fn check_username(
    query: web::Query<UsernameQuery>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = query.into_inner().username.ok_or(AppError::BadRequest)?;
    let exists = app_state
        .users
        .find_by_username(username.trim())
        .is_some();

    Ok(HttpResponse::Ok().json(json!({ "exists": exists })))
}

/// Pipe for creating an account
/// - url: `{domain}/api/auth/register`
///
/// # HTTP request requirements
/// ## body
/// - json with `username`, `name`, `password` (at least 10 characters)
///   and an optional `avatar` url
///
/// # Response
/// ## Ok
/// ## Error
/// - Bad request, on short passwords, blank fields or a taken username
#[post("/api/auth/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let username = request.username.trim().to_string();
    let name = request.name.trim().to_string();
    let password = request.password.trim();

    if username.is_empty() || name.is_empty() || password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest);
    }
    if app_state.users.find_by_username(&username).is_some() {
        return Err(AppError::BadRequest);
    }

    let user = User::new(&username, &name, &digest(password), request.avatar);
    app_state.users.insert(&user)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account created",
    })))
}

/// Pipe for logging in
/// - url: `{domain}/api/auth/login`
///
/// # HTTP request requirements
/// ## body
/// - json with `username` and `password` keys
///
/// # Response
/// ## Ok
/// - set cookie header containing the login token
/// ## Error
/// - Unauthorized
/// - Internal server error
#[post("/api/auth/login")]
pub async fn login(
    body: web::Json<Credentials>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credentials = body.into_inner();

    let user = app_state
        .users
        .find_by_username(credentials.username.trim())
        .ok_or(AppError::Unauthorized)?;
    if user.pass != digest(credentials.password) {
        return Err(AppError::Unauthorized);
    }

    let token = app_state.sessions.create(&user.id)?;
    let cookie = session_cookie(token)?;

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Logged in",
    })))
}
