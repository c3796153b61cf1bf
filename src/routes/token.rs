use actix_web::{
    cookie::Cookie,
    post, put,
    web::Data,
    HttpRequest, HttpResponse, Responder,
};
use serde_json::json;

use crate::{app::AppState, auth::session::SessionStore, routes::user::session_cookie};

/// Pipe for logging out: the session is deleted and the cookie removed
/// - url: `{domain}/api/auth/logout`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing the login token
///
/// # Response
/// ## Ok
/// ## Error
/// - Unauthorized
#[post("/api/auth/logout")]
pub async fn logout(req: HttpRequest, app_state: Data<AppState>) -> impl Responder {
    let token = match req.cookie("token") {
        Some(cookie) => cookie.value().to_string(),
        None => return HttpResponse::Unauthorized().finish(),
    };
    if app_state.sessions.find(&token).is_err() {
        return HttpResponse::Unauthorized().finish();
    }

    app_state.sessions.delete(&token);

    let mut removal = Cookie::build("token", "").path("/").finish();
    removal.make_removal();

    HttpResponse::Ok().cookie(removal).json(json!({
        "success": true,
        "message": "Logged out",
    }))
}

/// Pipe for refreshing a session for a server specified duration
/// - url: `{domain}/api/auth/refresh`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing the login token
///
/// # Response
/// ## Ok
/// - set cookie header carrying the re-armed login cookie
/// ## Error
/// - Unauthorized
#[put("/api/auth/refresh")]
pub async fn refresh_token(req: HttpRequest, app_state: Data<AppState>) -> impl Responder {
    let token = match req.cookie("token") {
        Some(cookie) => cookie.value().to_string(),
        None => return HttpResponse::Unauthorized().finish(),
    };
    if !app_state.sessions.refresh(&token) {
        return HttpResponse::Unauthorized().finish();
    }

    match session_cookie(token) {
        Ok(cookie) => HttpResponse::Ok().cookie(cookie).json(json!({
            "success": true,
            "message": "Session refreshed",
        })),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}
