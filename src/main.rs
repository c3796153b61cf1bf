pub mod app;
pub mod database;
pub mod schema;

mod auth;
mod guard;
mod routes;

use std::sync::Arc;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};

use app::AppState;
use auth::session::RedisSessions;
use database::db_utils::{psql_connect_to_db, redis_connect_to_db};
use database::postgres::PgStore;
use guard::AccessGuard;
use routes::{blog::*, tag::*, token::*, user::*};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let postgres_pool = psql_connect_to_db(None);
    let redis_pool = redis_connect_to_db(None);

    let store = Arc::new(PgStore::new(postgres_pool));
    let app_state = AppState {
        blogs: store.clone(),
        users: store,
        sessions: Arc::new(RedisSessions::new(redis_pool)),
    };

    log::info!("Server running...");
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(app_state.clone()))
            .wrap(AccessGuard)
            .wrap(Logger::default())
            //User routes
            .service(check_username)
            .service(register)
            .service(login)
            .service(blogs_by_username)
            //Blog routes, fixed paths before the {blog_id} ones
            .service(featured_blogs)
            .service(related_blogs)
            .service(create_blog)
            .service(get_blog)
            .service(like_blog)
            .service(delete_blog)
            //Tag routes
            .service(popular_tags)
            //Token routes
            .service(logout)
            .service(refresh_token)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
