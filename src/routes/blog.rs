use std::collections::HashMap;

use actix_web::{
    delete, get, post,
    web::{self, Data},
    HttpRequest, HttpResponse,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    app::{AppError, AppState},
    auth::identity::AuthUser,
    database::models::{
        blog::{valid_privacy, Blog, PRIVACY_PUBLIC},
        user::User,
    },
    database::store::{
        clamp_limit, BlogStore, RelatedQuery, UserStore, DEFAULT_FEATURED_LIMIT,
        DEFAULT_RELATED_LIMIT,
    },
    routes::LimitQuery,
};

#[derive(Serialize)]
pub struct AuthorPayload {
    pub id: String,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Blog as the API serves it: counters under their public names and the
/// author reference resolved into a small embedded object.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPayload {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author: Option<AuthorPayload>,
    pub likes_count: i32,
    pub view_count: i32,
    pub featured: bool,
    pub privacy: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeResponse {
    success: bool,
    message: String,
    liked: bool,
    likes_count: i32,
}

#[derive(Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub privacy: Option<String>,
}

#[derive(Deserialize)]
pub struct RelatedParams {
    pub exclude: Option<String>,
    pub tags: Option<String>,
    pub author: Option<String>,
    pub limit: Option<i64>,
}

fn to_payload(blog: Blog, author: Option<&User>) -> BlogPayload {
    BlogPayload {
        id: blog.id,
        title: blog.title,
        content: blog.content,
        tags: blog.tags,
        author: author.map(|user| AuthorPayload {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }),
        likes_count: blog.likes,
        view_count: blog.views,
        featured: blog.featured,
        privacy: blog.privacy,
        created_at: blog.created_at,
        updated_at: blog.updated_at,
    }
}

/// Resolves the author of every blog in one batch lookup. A missing
/// author just leaves the field empty rather than failing the list.
fn with_authors(app_state: &AppState, blogs: Vec<Blog>) -> Vec<BlogPayload> {
    let ids: Vec<String> = blogs.iter().map(|b| b.author_id.clone()).collect();
    let authors: HashMap<String, User> = match app_state.users.find_many(&ids) {
        Ok(found) => found.into_iter().map(|u| (u.id.clone(), u)).collect(),
        Err(_) => HashMap::new(),
    };

    blogs
        .into_iter()
        .map(|blog| {
            let author = authors.get(&blog.author_id).cloned();
            to_payload(blog, author.as_ref())
        })
        .collect()
}

/// Rejects anything that is not a syntactically valid blog id, before
/// any store access happens. Parsing also normalizes the value to the
/// hyphenated lowercase form the ids are stored in.
fn parse_blog_id(raw: &str) -> Result<String, AppError> {
    let id = Uuid::parse_str(raw)?;
    Ok(id.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Pipe for creating a new blog
/// - url: `{domain}/api/blogs`
///
/// # HTTP request requirements
/// ## header
/// - cookie with name `token`, containing the login token
/// ## body
/// - json with `title`, `content`, and optionally `tags` and `privacy`
///   (`"public"` or `"private"`, public when left out)
///
/// # Response
/// ## Ok
/// - json with the created blog under `blog`
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Internal server error
#[post("/api/blogs")]
pub async fn create_blog(
    auth: AuthUser,
    body: web::Json<CreateBlogRequest>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return Err(AppError::BadRequest);
    }
    let privacy = request.privacy.as_deref().unwrap_or(PRIVACY_PUBLIC);
    if !valid_privacy(privacy) {
        return Err(AppError::BadRequest);
    }

    let author = app_state
        .users
        .find_by_id(&auth.user_id)
        .map_err(|_| AppError::Unauthorized)?;

    let blog = Blog::new(
        &author.id,
        request.title.trim(),
        &request.content,
        normalize_tags(request.tags),
        privacy,
    );
    app_state.blogs.insert(&blog)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "blog": to_payload(blog, Some(&author)),
    })))
}

/// Pipe for the featured-blogs widget
/// - url: `{domain}/api/blogs/featured?limit=`
///
/// Public blogs, best first: featured flag, then like count, view count
/// and recency. A storage failure never bubbles up as an error status —
/// the widget is decoration, so it degrades to an empty list with
/// `success:false` instead of taking the page down with it.
#[get("/api/blogs/featured")]
pub async fn featured_blogs(
    query: web::Query<LimitQuery>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let limit = clamp_limit(query.limit, DEFAULT_FEATURED_LIMIT);

    match app_state.blogs.featured(limit) {
        Ok(found) => HttpResponse::Ok().json(json!({
            "success": true,
            "blogs": with_authors(&app_state, found),
        })),
        Err(err) => {
            log::warn!("featured blogs query failed: {}", err);
            HttpResponse::Ok().json(json!({ "success": false, "blogs": [] }))
        }
    }
}

/// Pipe for the related-blogs widget
/// - url: `{domain}/api/blogs/related?exclude&tags&author&limit`
///
/// `tags` is comma-separated; a blog is related when it shares a tag or
/// the author, and the current blog excludes itself via `exclude`.
/// Degrades to an empty list on failure, same as the featured widget.
#[get("/api/blogs/related")]
pub async fn related_blogs(
    query: web::Query<RelatedParams>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let params = query.into_inner();
    let related = RelatedQuery {
        exclude: params.exclude,
        tags: params
            .tags
            .map(|raw| normalize_tags(raw.split(',').map(String::from).collect()))
            .unwrap_or_default(),
        author: params.author,
        limit: clamp_limit(params.limit, DEFAULT_RELATED_LIMIT),
    };

    match app_state.blogs.related(&related) {
        Ok(found) => HttpResponse::Ok().json(json!({
            "blogs": with_authors(&app_state, found),
        })),
        Err(err) => {
            log::warn!("related blogs query failed: {}", err);
            HttpResponse::Ok().json(json!({ "blogs": [] }))
        }
    }
}

/// Pipe for fetching a single blog
/// - url: `{domain}/api/blogs/{blog_id}`
///
/// Public fetches bump the view counter. Private blogs exist only for
/// their author; everyone else gets the same not-found a bogus id gets.
#[get("/api/blogs/{blog_id}")]
pub async fn get_blog(
    req: HttpRequest,
    viewer: Option<AuthUser>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = parse_blog_id(req.match_info().query("blog_id"))?;

    let blog = app_state.blogs.get_by_id(&blog_id)?;
    let viewer_id = viewer.map(|v| v.user_id);
    if !blog.is_public() && viewer_id.as_deref() != Some(blog.author_id.as_str()) {
        return Err(AppError::NotFound);
    }

    let blog = if blog.is_public() {
        app_state.blogs.record_view(&blog.id)?
    } else {
        blog
    };
    let author = app_state.users.find_by_id(&blog.author_id).ok();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "blog": to_payload(blog, author.as_ref()),
    })))
}

/// Pipe for liking or unliking a blog. If the caller is not in the
/// blog's like set they join it, otherwise they leave it.
/// - url: `{domain}/api/blogs/{blog_id}/like`
///
/// # HTTP request requirements
/// - `{blog_id}` as a parameter, syntactically valid
/// ## header
/// - cookie with name `token`, containing the login token
///
/// # Response
/// ## Ok
/// - `{success, message, liked, likesCount}`
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Not found
/// - Internal server error
#[post("/api/blogs/{blog_id}/like")]
pub async fn like_blog(
    req: HttpRequest,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = parse_blog_id(req.match_info().query("blog_id"))?;

    let blog = app_state.blogs.get_by_id(&blog_id)?;
    if !blog.is_public() && auth.user_id != blog.author_id {
        return Err(AppError::NotFound);
    }

    let outcome = app_state.blogs.toggle_like(&blog_id, &auth.user_id)?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        message: if outcome.liked {
            "Blog liked".to_string()
        } else {
            "Like removed".to_string()
        },
        liked: outcome.liked,
        likes_count: outcome.likes,
    }))
}

/// Pipe for deleting a blog, like rows included
/// - url: `{domain}/api/blogs/{blog_id}`
///
/// # Response
/// ## Ok
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Forbidden
/// - Not found
#[delete("/api/blogs/{blog_id}")]
pub async fn delete_blog(
    req: HttpRequest,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = parse_blog_id(req.match_info().query("blog_id"))?;

    let blog = app_state.blogs.get_by_id(&blog_id)?;
    if blog.author_id != auth.user_id {
        return Err(AppError::Forbidden);
    }
    app_state.blogs.delete_by_id(&blog.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Blog deleted",
    })))
}

/// Pipe for listing the blogs of the user with the given username,
/// newest first. Private blogs show up only when the owner asks.
/// - url: `{domain}/api/users/{username}/blogs`
#[get("/api/users/{username}/blogs")]
pub async fn blogs_by_username(
    req: HttpRequest,
    viewer: Option<AuthUser>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = req.match_info().query("username").to_string();

    let user = app_state
        .users
        .find_by_username(&username)
        .ok_or(AppError::NotFound)?;
    let include_private = viewer.map(|v| v.user_id).as_deref() == Some(user.id.as_str());

    let found = app_state.blogs.get_by_author(&user.id, include_private)?;
    let blogs: Vec<BlogPayload> = found
        .into_iter()
        .map(|blog| to_payload(blog, Some(&user)))
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "success": true, "blogs": blogs })))
}
