pub mod blog;
pub mod tag;
pub mod token;
pub mod user;

use serde::Deserialize;

/// Query string carrying nothing but an optional result cap.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}
