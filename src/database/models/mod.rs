pub mod blog;
pub mod like;
pub mod user;
