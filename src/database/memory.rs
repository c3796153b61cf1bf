use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use rand::distributions::{Alphanumeric, DistString};

use crate::app::{AppError, AppState};
use crate::auth::session::SessionStore;
use crate::database::models::{blog::Blog, user::User};
use crate::database::postgres::count_tags;
use crate::database::store::{BlogStore, LikeOutcome, RelatedQuery, TagCount, UserStore};

/// In-memory stand-in for the Postgres store so the handler suites run
/// without a live database. Mirrors the query semantics of `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    blogs: RwLock<HashMap<String, Blog>>,
    likes: RwLock<HashSet<(String, String)>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a fully formed blog straight into the store, bypassing the
    /// handler path, so tests control featured/views/likes fields.
    pub fn seed_blog(&self, blog: Blog) {
        self.blogs.write().unwrap().insert(blog.id.clone(), blog);
    }

    pub fn seed_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id.clone(), user);
    }

    pub fn blog_snapshot(&self, blog_id: &str) -> Option<Blog> {
        self.blogs.read().unwrap().get(blog_id).cloned()
    }

    pub fn blog_count(&self) -> usize {
        self.blogs.read().unwrap().len()
    }
}

impl BlogStore for MemoryStore {
    fn insert(&self, blog: &Blog) -> Result<(), AppError> {
        self.seed_blog(blog.clone());
        Ok(())
    }

    fn get_by_id(&self, blog_id: &str) -> Result<Blog, AppError> {
        self.blog_snapshot(blog_id).ok_or(AppError::NotFound)
    }

    fn get_by_author(
        &self,
        author_id: &str,
        include_private: bool,
    ) -> Result<Vec<Blog>, AppError> {
        let mut found: Vec<Blog> = self
            .blogs
            .read()
            .unwrap()
            .values()
            .filter(|b| b.author_id == author_id && (include_private || b.is_public()))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(found)
    }

    fn featured(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        let mut found: Vec<Blog> = self
            .blogs
            .read()
            .unwrap()
            .values()
            .filter(|b| b.is_public())
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then(b.likes.cmp(&a.likes))
                .then(b.views.cmp(&a.views))
                .then(b.created_at.cmp(&a.created_at))
        });
        found.truncate(limit as usize);

        Ok(found)
    }

    fn related(&self, query: &RelatedQuery) -> Result<Vec<Blog>, AppError> {
        if query.author.is_none() && query.tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: Vec<Blog> = self
            .blogs
            .read()
            .unwrap()
            .values()
            .filter(|b| b.is_public())
            .filter(|b| query.exclude.as_deref() != Some(b.id.as_str()))
            .filter(|b| {
                let same_author = query.author.as_deref() == Some(b.author_id.as_str());
                let shares_tag = b.tags.iter().any(|t| query.tags.contains(t));
                same_author || shares_tag
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(query.limit as usize);

        Ok(found)
    }

    fn popular_tags(&self, limit: i64) -> Result<Vec<TagCount>, AppError> {
        let rows: Vec<Vec<String>> = self
            .blogs
            .read()
            .unwrap()
            .values()
            .filter(|b| b.is_public())
            .map(|b| b.tags.clone())
            .collect();

        Ok(count_tags(rows, limit))
    }

    fn toggle_like(&self, blog_id: &str, user_id: &str) -> Result<LikeOutcome, AppError> {
        let mut blogs = self.blogs.write().unwrap();
        let blog = blogs.get_mut(blog_id).ok_or(AppError::NotFound)?;

        let key = (user_id.to_string(), blog_id.to_string());
        let mut likes = self.likes.write().unwrap();
        let liked = likes.insert(key.clone());
        //Same rule as the SQL store: the counter only moves when the
        //membership row actually changed hands
        if liked {
            blog.likes += 1;
        } else if likes.remove(&key) {
            blog.likes -= 1;
        }

        Ok(LikeOutcome {
            liked,
            likes: blog.likes,
        })
    }

    fn record_view(&self, blog_id: &str) -> Result<Blog, AppError> {
        let mut blogs = self.blogs.write().unwrap();
        let blog = blogs.get_mut(blog_id).ok_or(AppError::NotFound)?;
        blog.views += 1;

        Ok(blog.clone())
    }

    fn delete_by_id(&self, blog_id: &str) -> Result<(), AppError> {
        self.likes
            .write()
            .unwrap()
            .retain(|(_, liked_blog)| liked_blog != blog_id);
        self.blogs
            .write()
            .unwrap()
            .remove(blog_id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}

impl UserStore for MemoryStore {
    fn insert(&self, user: &User) -> Result<(), AppError> {
        if self.find_by_username(&user.username).is_some() {
            //Same answer the unique index gives
            return Err(AppError::BadRequest);
        }
        self.seed_user(user.clone());

        Ok(())
    }

    fn find_by_id(&self, user_id: &str) -> Result<User, AppError> {
        self.users
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        let users = self.users.read().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

/// Session tokens in a plain map, no TTL. Enough for the guard and the
/// identity extractor to behave exactly as they do against Redis.
#[derive(Default)]
pub struct MemorySessions {
    tokens: RwLock<HashMap<String, String>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessions {
    fn create(&self, user_id: &str) -> Result<String, AppError> {
        let token = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
        self.tokens
            .write()
            .unwrap()
            .insert(token.clone(), user_id.to_string());

        Ok(token)
    }

    fn find(&self, token: &str) -> Result<String, AppError> {
        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }

    fn delete(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }

    fn refresh(&self, token: &str) -> bool {
        self.tokens.read().unwrap().contains_key(token)
    }
}

/// Wires an `AppState` over fresh in-memory stores and hands the
/// concrete handles back for seeding and inspection.
pub fn test_state() -> (AppState, Arc<MemoryStore>, Arc<MemorySessions>) {
    let store = Arc::new(MemoryStore::new());
    let sessions = Arc::new(MemorySessions::new());
    let state = AppState {
        blogs: store.clone(),
        users: store.clone(),
        sessions: sessions.clone(),
    };

    (state, store, sessions)
}

/// A user with the standard test credentials (`test_password123`).
pub fn sample_user(username: &str) -> User {
    User::new(username, "Test User", &sha256::digest("test_password123"), None)
}

mod tests {
    use super::*;
    use crate::database::models::blog::PRIVACY_PUBLIC;

    #[test]
    fn toggle_storm_keeps_counter_in_step_with_the_set() {
        let store = Arc::new(MemoryStore::new());
        let user = sample_user("Test_user123");
        store.seed_user(user.clone());
        let blog = Blog::new(&user.id, "Test title", "Test body", vec![], PRIVACY_PUBLIC);
        store.seed_blog(blog.clone());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            let blog_id = blog.id.clone();
            let user_id = user.id.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    store.toggle_like(&blog_id, &user_id).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        //An even number of toggles lands back on zero, never below it
        let likes = store.blog_snapshot(&blog.id).unwrap().likes;
        assert_eq!(likes, 0);
    }

    #[test]
    fn unlike_with_no_membership_row_leaves_the_counter_alone() {
        let store = MemoryStore::new();
        let user = sample_user("Test_user123");
        store.seed_user(user.clone());

        let mut blog = Blog::new(&user.id, "Test title", "Test body", vec![], PRIVACY_PUBLIC);
        blog.likes = 3;
        store.seed_blog(blog.clone());

        //No membership row seeded, so the first toggle must be a like
        let outcome = store.toggle_like(&blog.id, &user.id).unwrap();
        assert!(outcome.liked);
        assert_eq!(outcome.likes, 4);

        let outcome = store.toggle_like(&blog.id, &user.id).unwrap();
        assert!(!outcome.liked);
        assert_eq!(outcome.likes, 3);
    }
}
