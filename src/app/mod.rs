use std::fmt::Display;
use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::database::blogs::PgBlogRepository;
use crate::database::comments::PgCommentRepository;
use crate::database::db_utils::PgPool;
use crate::database::users::PgUserRepository;
use crate::service::blog::BlogService;
use crate::service::comment::CommentService;
use crate::service::user::UserService;

pub mod ctx;

/** Holds the services used when handling requests */
pub struct AppState {
    pub users: UserService<PgUserRepository>,
    pub blogs: BlogService<PgBlogRepository>,
    pub comments: CommentService<PgCommentRepository, PgBlogRepository>,
}

impl AppState {
    pub fn new(pool: PgPool) -> AppState {
        let pool = Arc::new(pool);
        AppState {
            users: UserService::new(PgUserRepository::new(pool.clone())),
            blogs: BlogService::new(PgBlogRepository::new(pool.clone())),
            comments: CommentService::new(
                PgCommentRepository::new(pool.clone()),
                PgBlogRepository::new(pool),
            ),
        }
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            blogs: self.blogs.clone(),
            comments: self.comments.clone(),
        }
    }
}

/** JSON envelope wrapping every response body */
#[derive(Serialize)]
pub struct Response<T: Serialize> {
    pub message: String,
    pub data: Option<T>,
}

/** Holds the errors we use during request processing */
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Database(diesel::result::Error),
    Pool(String),
    Hashing(String),
    Canceled,
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(message) => f.write_str(message),
            AppError::Database(err) => write!(f, "database error: {}", err),
            AppError::Pool(message) => write!(f, "connection pool error: {}", message),
            AppError::Hashing(message) => write!(f, "credential hashing error: {}", message),
            AppError::Canceled => f.write_str("request canceled or deadline exceeded"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::Canceled => actix_web::http::StatusCode::REQUEST_TIMEOUT,
            AppError::Database(_) | AppError::Pool(_) | AppError::Hashing(_) => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        HttpResponse::build(self.status_code()).json(Response::<()> {
            message: self.to_string(),
            data: None,
        })
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        AppError::Database(err)
    }
}

impl std::error::Error for AppError {}
