use actix_web::{delete, get, post, put, web::Data, HttpRequest, HttpResponse};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::app::ctx::Ctx;
use crate::app::{AppError, AppState, Response};
use crate::database::models::blog::Blog;
use crate::database::models::like::{BlogLike, CommentLike};
use crate::database::models::user::{User, UserWithRelations};
use crate::routes::REQUEST_TIMEOUT;
use crate::service::user::{SignUpRequest, UserUpdateRequest};

/// User shape exposed over HTTP. The stored credential is stripped at
/// this boundary, never earlier.
#[derive(Serialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct UserDetailView {
    #[serde(flatten)]
    pub user: UserView,
    pub blogs: Vec<Blog>,
    pub blog_likes: Vec<BlogLike>,
    pub comment_likes: Vec<CommentLike>,
}

impl From<UserWithRelations> for UserDetailView {
    fn from(hydrated: UserWithRelations) -> Self {
        UserDetailView {
            user: UserView::from(hydrated.user),
            blogs: hydrated.blogs,
            blog_likes: hydrated.blog_likes,
            comment_likes: hydrated.comment_likes,
        }
    }
}

/// Pipe for signing up a new user
/// - url: `{domain}/users/signup`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing `name`, `username`, `email`,
///   `password` and `role` keys
///
/// # Response
/// ## Created
/// - the persisted user, credential stripped
/// ## Error
/// - Bad request on missing fields or duplicate username/email
#[post("/users/signup")]
pub async fn sign_up(req_body: String, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let request = serde_json::from_str::<SignUpRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process user sign up request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let user = app_state.users.create_new_user(&ctx, request)?;

    Ok(HttpResponse::Created().json(Response {
        message: "user signed up successfully".to_string(),
        data: Some(UserView::from(user)),
    }))
}

/// Pipe for fetching all users, each with its blogs and likes
/// - url: `{domain}/users`
#[get("/users")]
pub async fn get_all_users(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let users = app_state.users.get_all_users(&ctx)?;

    let message = if users.is_empty() {
        "no user found"
    } else {
        "successfully fetched all users"
    };
    let views: Vec<UserDetailView> = users.into_iter().map(UserDetailView::from).collect();

    Ok(HttpResponse::Ok().json(Response {
        message: message.to_string(),
        data: Some(views),
    }))
}

/// Pipe for fetching a single user by username
/// - url: `{domain}/users/{username}`
///
/// # Response
/// ## Ok
/// - the user with its blogs and likes, or a `user not found` message
///   with null data when no such user exists
#[get("/users/{username}")]
pub async fn get_user_by_username(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = req.match_info().query("username").to_string();

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let user = app_state.users.get_user_by_username(&ctx, &username)?;

    let response = match user {
        Some(user) => Response {
            message: "successfully fetched user".to_string(),
            data: Some(UserDetailView::from(user)),
        },
        None => Response {
            message: "user not found".to_string(),
            data: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Pipe for updating a user
/// - url: `{domain}/users/{username}`
///
/// # HTTP request requirements
/// ## body
/// - json with any of `name`, `email`, `password`, `role`; absent keys
///   keep their stored values
#[put("/users/{username}")]
pub async fn update_user(
    req: HttpRequest,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = req.match_info().query("username").to_string();
    let request = serde_json::from_str::<UserUpdateRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process user update request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let user = app_state.users.update_user(&ctx, &username, request)?;

    Ok(HttpResponse::Ok().json(Response {
        message: "user updated successfully".to_string(),
        data: Some(UserView::from(user)),
    }))
}

/// Pipe for soft-deleting a user
/// - url: `{domain}/users/{username}`
#[delete("/users/{username}")]
pub async fn delete_user(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = req.match_info().query("username").to_string();

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    app_state.users.delete_user(&ctx, &username)?;

    Ok(HttpResponse::Ok().json(Response::<()> {
        message: "user deleted successfully".to_string(),
        data: None,
    }))
}
