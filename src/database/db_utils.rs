use std::{env, sync::Arc};

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use dotenv::dotenv;
use r2d2_redis::RedisConnectionManager;

/// Builds the Postgres connection pool.
/// Requires `DATABASE_URL` in the environment unless `url` overrides it.
///
/// # Example
/// ```
/// let pool = psql_connect_to_db(None);
/// ```
pub fn psql_connect_to_db(url: Option<&str>) -> Arc<Pool<ConnectionManager<PgConnection>>> {
    dotenv().ok();

    let database_url = match url {
        Some(given) => given.to_string(),
        None => env::var("DATABASE_URL").expect("Enviroment variable: 'DATABASE_URL' not set"),
    };
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Arc::new(
        Pool::builder()
            .build(manager)
            .expect("Failed to build the Postgres pool"),
    )
}

/// Builds the Redis connection pool used for session tokens.
/// Reads `REDIS_URL`, falling back to a local instance.
pub fn redis_connect_to_db(url: Option<&str>) -> Arc<r2d2_redis::r2d2::Pool<RedisConnectionManager>> {
    dotenv().ok();

    let redis_url = match url {
        Some(given) => given.to_string(),
        None => env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1/")),
    };
    let manager =
        RedisConnectionManager::new(redis_url).expect("Failed to parse the Redis url");

    Arc::new(
        r2d2_redis::r2d2::Pool::builder()
            .build(manager)
            .expect("Failed to build the Redis pool"),
    )
}
