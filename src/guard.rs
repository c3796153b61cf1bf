use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web::Data,
    Error, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::app::AppState;
use crate::auth::session::SessionStore;

/// Page prefixes that require a logged-in user.
pub const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/blogs/new", "/profile", "/settings"];

pub const LOGIN_PATH: &str = "/auth/login";

/// Whether `path` falls under one of the protected prefixes. Matches
/// whole path segments only, so `/dashboard-public` stays open while
/// `/dashboard/drafts` does not.
fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
    })
}

fn login_redirect(path: &str) -> String {
    match serde_urlencoded::to_string([("redirect", path)]) {
        Ok(query) => format!("{}?{}", LOGIN_PATH, query),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

fn has_session(req: &ServiceRequest) -> bool {
    let token = match req.cookie("token") {
        Some(cookie) => cookie,
        None => return false,
    };

    match req.app_data::<Data<AppState>>() {
        Some(state) => state.sessions.find(token.value()).is_ok(),
        None => false,
    }
}

/** Middleware guarding the authenticated sections of the site. A request
to a protected prefix without a live session gets bounced to the login
page, with the original path attached so the user lands back where they
started. Everything else passes through untouched. */
pub struct AccessGuard;

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardMiddleware { service }))
    }
}

pub struct AccessGuardMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_protected(req.path()) && !has_session(&req) {
            let location = login_redirect(req.path());
            let (req, _payload) = req.into_parts();
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish()
                .map_into_right_body();

            return Box::pin(ready(Ok(ServiceResponse::new(req, response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
