use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use serde_json::json;

use crate::{
    app::AppState,
    database::store::{clamp_limit, BlogStore, DEFAULT_TAG_LIMIT},
    routes::LimitQuery,
};

/// Pipe for the popular-tags widget
/// - url: `{domain}/api/tags/popular?limit=`
///
/// Tag frequency across all public blogs, most used first. Pure read;
/// a storage failure degrades to an empty list with `success:false`
/// rather than an error status, so the page keeps rendering.
#[get("/api/tags/popular")]
pub async fn popular_tags(
    query: web::Query<LimitQuery>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let limit = clamp_limit(query.limit, DEFAULT_TAG_LIMIT);

    match app_state.blogs.popular_tags(limit) {
        Ok(tags) => HttpResponse::Ok().json(json!({ "success": true, "data": tags })),
        Err(err) => {
            log::warn!("popular tags query failed: {}", err);
            HttpResponse::Ok().json(json!({ "success": false, "data": [] }))
        }
    }
}
