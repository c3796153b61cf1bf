use std::collections::HashMap;
use std::sync::Arc;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::PgConnection;

use crate::app::AppError;
use crate::database::models::{
    blog::{Blog, PRIVACY_PUBLIC},
    like::Like,
    user::User,
};
use crate::database::store::{BlogStore, LikeOutcome, RelatedQuery, TagCount, UserStore};
use crate::schema::{blogs, likes, users};

/** Diesel-backed storage, shared by every handler through the store traits */
pub struct PgStore {
    pool: Arc<Pool<ConnectionManager<PgConnection>>>,
}

impl PgStore {
    pub fn new(pool: Arc<Pool<ConnectionManager<PgConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, AppError> {
        self.pool.get().map_err(|_| AppError::InternalServerError)
    }
}

impl BlogStore for PgStore {
    fn insert(&self, blog: &Blog) -> Result<(), AppError> {
        let mut conn = self.conn()?;

        diesel::insert_into(blogs::table)
            .values(blog)
            .execute(&mut conn)?;

        Ok(())
    }

    fn get_by_id(&self, blog_id: &str) -> Result<Blog, AppError> {
        let mut conn = self.conn()?;

        blogs::table
            .find(blog_id)
            .first::<Blog>(&mut conn)
            .map_err(AppError::from)
    }

    fn get_by_author(
        &self,
        author_id: &str,
        include_private: bool,
    ) -> Result<Vec<Blog>, AppError> {
        let mut conn = self.conn()?;

        let mut query = blogs::table
            .filter(blogs::author_id.eq(author_id))
            .into_boxed();
        if !include_private {
            query = query.filter(blogs::privacy.eq(PRIVACY_PUBLIC));
        }

        query
            .order(blogs::created_at.desc())
            .load::<Blog>(&mut conn)
            .map_err(AppError::from)
    }

    fn featured(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        let mut conn = self.conn()?;

        blogs::table
            .filter(blogs::privacy.eq(PRIVACY_PUBLIC))
            .order((
                blogs::featured.desc(),
                blogs::likes.desc(),
                blogs::views.desc(),
                blogs::created_at.desc(),
            ))
            .limit(limit)
            .load::<Blog>(&mut conn)
            .map_err(AppError::from)
    }

    fn related(&self, query: &RelatedQuery) -> Result<Vec<Blog>, AppError> {
        //Nothing to match against means nothing is related
        if query.author.is_none() && query.tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let mut found = blogs::table
            .filter(blogs::privacy.eq(PRIVACY_PUBLIC))
            .into_boxed();
        if let Some(exclude) = &query.exclude {
            found = found.filter(blogs::id.ne(exclude));
        }
        found = match (&query.author, query.tags.is_empty()) {
            (Some(author), false) => found.filter(
                blogs::author_id
                    .eq(author)
                    .or(blogs::tags.overlaps_with(query.tags.clone())),
            ),
            (Some(author), true) => found.filter(blogs::author_id.eq(author)),
            (None, _) => found.filter(blogs::tags.overlaps_with(query.tags.clone())),
        };

        found
            .order(blogs::created_at.desc())
            .limit(query.limit)
            .load::<Blog>(&mut conn)
            .map_err(AppError::from)
    }

    fn popular_tags(&self, limit: i64) -> Result<Vec<TagCount>, AppError> {
        let mut conn = self.conn()?;

        let rows: Vec<Vec<String>> = blogs::table
            .filter(blogs::privacy.eq(PRIVACY_PUBLIC))
            .select(blogs::tags)
            .load(&mut conn)?;

        Ok(count_tags(rows, limit))
    }

    fn toggle_like(&self, blog_id: &str, user_id: &str) -> Result<LikeOutcome, AppError> {
        let mut conn = self.conn()?;

        //NotFound before anything touches the like set
        blogs::table
            .find(blog_id)
            .select(blogs::id)
            .first::<String>(&mut conn)?;

        let like = Like {
            user_id: user_id.to_string(),
            blog_id: blog_id.to_string(),
        };
        let inserted = diesel::insert_into(likes::table)
            .values(&like)
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        //The insert (or its absence) decides the direction; the counter
        //moves with a single-statement update, so concurrent toggles on
        //the same row cannot lose each other's writes.
        let count = if inserted == 1 {
            diesel::update(blogs::table.find(blog_id))
                .set(blogs::likes.eq(blogs::likes + 1))
                .returning(blogs::likes)
                .get_result::<i32>(&mut conn)?
        } else {
            let removed = diesel::delete(
                likes::table
                    .filter(likes::user_id.eq(user_id))
                    .filter(likes::blog_id.eq(blog_id)),
            )
            .execute(&mut conn)?;

            //A racing toggle may have taken the membership row already;
            //only a delete that actually removed it moves the counter.
            if removed == 1 {
                diesel::update(blogs::table.find(blog_id))
                    .set(blogs::likes.eq(blogs::likes - 1))
                    .returning(blogs::likes)
                    .get_result::<i32>(&mut conn)?
            } else {
                blogs::table
                    .find(blog_id)
                    .select(blogs::likes)
                    .first::<i32>(&mut conn)?
            }
        };

        Ok(LikeOutcome {
            liked: inserted == 1,
            likes: count,
        })
    }

    fn record_view(&self, blog_id: &str) -> Result<Blog, AppError> {
        let mut conn = self.conn()?;

        diesel::update(blogs::table.find(blog_id))
            .set(blogs::views.eq(blogs::views + 1))
            .get_result::<Blog>(&mut conn)
            .map_err(AppError::from)
    }

    fn delete_by_id(&self, blog_id: &str) -> Result<(), AppError> {
        let mut conn = self.conn()?;

        //One transaction, so a like landing between the two deletes
        //cannot strand a row pointing at a blog that is already gone
        conn.transaction(|conn| {
            diesel::delete(likes::table.filter(likes::blog_id.eq(blog_id))).execute(conn)?;
            let deleted = diesel::delete(blogs::table.find(blog_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }

            Ok(())
        })
    }
}

impl UserStore for PgStore {
    fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut conn = self.conn()?;

        diesel::insert_into(users::table)
            .values(user)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_by_id(&self, user_id: &str) -> Result<User, AppError> {
        let mut conn = self.conn()?;

        users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .map_err(AppError::from)
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        let mut conn = self.conn().ok()?;

        users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut conn)
            .ok()
    }

    fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        let mut conn = self.conn()?;

        users::table
            .filter(users::id.eq_any(ids))
            .load::<User>(&mut conn)
            .map_err(AppError::from)
    }
}

/// Folds per-blog tag lists into a capped frequency ranking. Ties break
/// on the tag name so the order is stable.
pub fn count_tags(rows: Vec<Vec<String>>, limit: i64) -> Vec<TagCount> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for tags in rows {
        for tag in tags {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit as usize);

    ranked
}
