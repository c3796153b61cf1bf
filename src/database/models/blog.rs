use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::blogs;

pub const PRIVACY_PUBLIC: &str = "public";
pub const PRIVACY_PRIVATE: &str = "private";

pub fn valid_privacy(value: &str) -> bool {
    value == PRIVACY_PUBLIC || value == PRIVACY_PRIVATE
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Queryable, Insertable)]
#[derive(Serialize, Deserialize)]
#[diesel(table_name = blogs)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author_id: String,
    pub likes: i32,
    pub views: i32,
    pub featured: bool,
    pub privacy: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Blog {
    /// Builds a fresh blog with a generated id and zeroed counters.
    /// Persisting it is the store's job.
    pub fn new(
        author_id: &str,
        title: &str,
        content: &str,
        tags: Vec<String>,
        privacy: &str,
    ) -> Blog {
        let time = Utc::now().naive_utc();

        Blog {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags,
            author_id: author_id.to_string(),
            likes: 0,
            views: 0,
            featured: false,
            privacy: privacy.to_string(),
            created_at: time,
            updated_at: time,
        }
    }

    pub fn is_public(&self) -> bool {
        self.privacy == PRIVACY_PUBLIC
    }
}
