use actix_web::{get, post, web::Data, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::app::ctx::Ctx;
use crate::app::{AppError, AppState, Response};
use crate::routes::REQUEST_TIMEOUT;
use crate::service::comment::CommentRequest;

#[derive(Deserialize)]
struct LikeRequest {
    pub user_id: i64,
}

/// Pipe for commenting on a blog
/// - url: `{domain}/blogs/{blog_id}/comments`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing `user_id` and `body` keys
#[post("/blogs/{blog_id}/comments")]
pub async fn create_comment(
    req: HttpRequest,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req
        .match_info()
        .query("blog_id")
        .parse::<i64>()
        .map_err(|_| AppError::Validation("invalid blog id".to_string()))?;
    let request = serde_json::from_str::<CommentRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process comment request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let comment = app_state
        .comments
        .create_blog_comment(&ctx, blog_id, request)?;

    Ok(HttpResponse::Created().json(Response {
        message: "comment created successfully".to_string(),
        data: Some(comment),
    }))
}

/// Pipe for fetching all comments, each with its likes
/// - url: `{domain}/comments`
#[get("/comments")]
pub async fn get_all_comments(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let comments = app_state.comments.get_all_comments(&ctx)?;

    let message = if comments.is_empty() {
        "no comment found"
    } else {
        "successfully fetched all comments"
    };

    Ok(HttpResponse::Ok().json(Response {
        message: message.to_string(),
        data: Some(comments),
    }))
}

/// Pipe for fetching a single comment by id
/// - url: `{domain}/comments/{comment_id}`
#[get("/comments/{comment_id}")]
pub async fn get_comment_by_id(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let comment_id = req
        .match_info()
        .query("comment_id")
        .parse::<i64>()
        .map_err(|_| AppError::Validation("invalid comment id".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let comment = app_state.comments.get_comment_by_id(&ctx, comment_id)?;

    let response = match comment {
        Some(comment) => Response {
            message: "successfully fetched comment".to_string(),
            data: Some(comment),
        },
        None => Response {
            message: "comment not found".to_string(),
            data: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Pipe for liking a comment
/// - url: `{domain}/comments/{comment_id}/like`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing a `user_id` key
#[post("/comments/{comment_id}/like")]
pub async fn like_comment(
    req: HttpRequest,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let comment_id = req
        .match_info()
        .query("comment_id")
        .parse::<i64>()
        .map_err(|_| AppError::Validation("invalid comment id".to_string()))?;
    let request = serde_json::from_str::<LikeRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process like request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let like = app_state
        .comments
        .like_comment(&ctx, comment_id, request.user_id)?;

    Ok(HttpResponse::Created().json(Response {
        message: "comment liked successfully".to_string(),
        data: Some(like),
    }))
}
