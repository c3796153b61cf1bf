use std::sync::Arc;

use r2d2_redis::r2d2::Pool;
use r2d2_redis::redis::Commands;
use r2d2_redis::RedisConnectionManager;
use rand::distributions::{Alphanumeric, DistString};

use crate::app::AppError;

pub const SESSION_TTL_SECS: usize = 3600;

/// Issues and checks the opaque tokens handed out at login. A token is
/// just a key mapping to the user id it was minted for; whoever presents
/// it is that user until it expires or gets deleted.
pub trait SessionStore: Send + Sync {
    /// Mints a token for `user_id` and stores it with the session TTL.
    fn create(&self, user_id: &str) -> Result<String, AppError>;
    /// Resolves a token back to its user id. Unknown or expired tokens
    /// answer `Unauthorized`.
    fn find(&self, token: &str) -> Result<String, AppError>;
    fn delete(&self, token: &str);
    /// Re-arms the TTL. Returns whether the token was still alive.
    fn refresh(&self, token: &str) -> bool;
}

pub struct RedisSessions {
    pool: Arc<Pool<RedisConnectionManager>>,
}

impl RedisSessions {
    pub fn new(pool: Arc<Pool<RedisConnectionManager>>) -> Self {
        Self { pool }
    }
}

impl SessionStore for RedisSessions {
    fn create(&self, user_id: &str) -> Result<String, AppError> {
        let mut conn = self.pool.get().map_err(|_| AppError::InternalServerError)?;

        let token = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
        conn.set_ex::<&str, &str, ()>(&token, user_id, SESSION_TTL_SECS)?;

        Ok(token)
    }

    fn find(&self, token: &str) -> Result<String, AppError> {
        let mut conn = self.pool.get().map_err(|_| AppError::InternalServerError)?;

        conn.get::<&str, String>(token)
            .map_err(|_| AppError::Unauthorized)
    }

    fn delete(&self, token: &str) {
        if let Ok(mut conn) = self.pool.get() {
            let _res = conn.del::<&str, i32>(token);
        }
    }

    fn refresh(&self, token: &str) -> bool {
        let mut conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(_) => return false,
        };

        if conn.get::<&str, String>(token).is_err() {
            return false;
        }

        conn.expire::<&str, i32>(token, SESSION_TTL_SECS).is_ok()
    }
}
