use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::users;

#[derive(Debug, Clone)]
#[derive(Queryable, Insertable)]
#[derive(Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    ///SHA256 of the password
    #[serde(skip_serializing)]
    pub pass: String,
}

impl User {
    pub fn new(username: &str, name: &str, pass_hash: &str, avatar: Option<String>) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            name: name.to_string(),
            avatar,
            pass: pass_hash.to_string(),
        }
    }
}
