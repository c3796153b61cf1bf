use diesel::prelude::*;

use crate::schema::likes;

/// One membership row of a blog's like set.
#[derive(Debug, Clone)]
#[derive(Insertable, Queryable)]
#[diesel(table_name = likes)]
pub struct Like {
    pub user_id: String,
    pub blog_id: String,
}
