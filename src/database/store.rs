use serde::Serialize;

use crate::app::AppError;
use crate::database::models::{blog::Blog, user::User};

pub const DEFAULT_FEATURED_LIMIT: i64 = 6;
pub const DEFAULT_RELATED_LIMIT: i64 = 3;
pub const DEFAULT_TAG_LIMIT: i64 = 10;
pub const MAX_QUERY_LIMIT: i64 = 50;

/// Clamps a caller-supplied result cap to something the widget queries
/// can live with. Missing or nonsensical values fall back to `default`.
pub fn clamp_limit(requested: Option<i64>, default: i64) -> i64 {
    match requested {
        Some(n) if n > 0 => n.min(MAX_QUERY_LIMIT),
        _ => default,
    }
}

/// Result of flipping a caller's membership in a blog's like set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: i32,
}

/// Filters for the related-blogs widget. A blog is related when it
/// shares a tag with `tags` or was written by `author`.
#[derive(Debug, Clone, Default)]
pub struct RelatedQuery {
    pub exclude: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// Storage seam for blogs. Handlers only ever talk to this trait, so the
/// backing engine can be swapped out (Postgres in production, an
/// in-memory map in the handler tests).
pub trait BlogStore: Send + Sync {
    fn insert(&self, blog: &Blog) -> Result<(), AppError>;
    fn get_by_id(&self, blog_id: &str) -> Result<Blog, AppError>;
    /// A user's blogs, newest first. Private ones only when asked for.
    fn get_by_author(&self, author_id: &str, include_private: bool)
        -> Result<Vec<Blog>, AppError>;
    /// Public blogs ordered by featured flag, like count, view count and
    /// recency, in that order.
    fn featured(&self, limit: i64) -> Result<Vec<Blog>, AppError>;
    fn related(&self, query: &RelatedQuery) -> Result<Vec<Blog>, AppError>;
    /// Tag frequency across public blogs, descending by count.
    fn popular_tags(&self, limit: i64) -> Result<Vec<TagCount>, AppError>;
    /// Atomically flips `user_id`'s membership in the blog's like set and
    /// keeps the like counter in step. Two racing toggles cannot lose an
    /// update: the membership row insert/delete decides the direction.
    fn toggle_like(&self, blog_id: &str, user_id: &str) -> Result<LikeOutcome, AppError>;
    /// Bumps the view counter and returns the updated blog.
    fn record_view(&self, blog_id: &str) -> Result<Blog, AppError>;
    fn delete_by_id(&self, blog_id: &str) -> Result<(), AppError>;
}

/// Storage seam for user accounts.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: &User) -> Result<(), AppError>;
    fn find_by_id(&self, user_id: &str) -> Result<User, AppError>;
    fn find_by_username(&self, username: &str) -> Option<User>;
    /// Batch lookup used when embedding authors into blog payloads.
    fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
}
