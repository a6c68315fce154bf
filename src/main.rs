#[macro_use]
extern crate diesel;
extern crate dotenv;

pub mod app;
pub mod auth;
pub mod database;
pub mod schema;
pub mod service;

mod routes;

use actix_web::{App, HttpServer};
use log::info;

use app::AppState;
use database::db_utils::psql_connect_to_db;
use routes::{blog::*, comment::*, user::*};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let pool = psql_connect_to_db(None);
    let app_state = AppState::new(pool);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| String::from("127.0.0.1:8080"));
    info!("Server running on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(app_state.clone()))
            //User routes
            .service(sign_up)
            .service(get_all_users)
            .service(get_user_by_username)
            .service(update_user)
            .service(delete_user)
            //Blog routes
            .service(create_new_blog)
            .service(get_all_blogs)
            .service(get_blog_by_id)
            .service(like_blog)
            //Comment routes
            .service(create_comment)
            .service(get_all_comments)
            .service(get_comment_by_id)
            .service(like_comment)
    })
    .bind(bind_addr)?
    .run()
    .await
}
