use actix_web::{get, post, web::Data, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::app::ctx::Ctx;
use crate::app::{AppError, AppState, Response};
use crate::routes::REQUEST_TIMEOUT;
use crate::service::blog::BlogRequest;

#[derive(Deserialize)]
struct LikeRequest {
    pub user_id: i64,
}

/// Pipe for creating a blog
/// - url: `{domain}/blogs`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing `user_id`, `title` and `body` keys
#[post("/blogs")]
pub async fn create_new_blog(
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = serde_json::from_str::<BlogRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process blog request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let blog = app_state.blogs.create_new_blog(&ctx, request)?;

    Ok(HttpResponse::Created().json(Response {
        message: "blog created successfully".to_string(),
        data: Some(blog),
    }))
}

/// Pipe for fetching all blogs, each with its comments and likes
/// - url: `{domain}/blogs`
#[get("/blogs")]
pub async fn get_all_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let blogs = app_state.blogs.get_all_blogs(&ctx)?;

    let message = if blogs.is_empty() {
        "no blog found"
    } else {
        "successfully fetched all blogs"
    };

    Ok(HttpResponse::Ok().json(Response {
        message: message.to_string(),
        data: Some(blogs),
    }))
}

/// Pipe for fetching a single blog by id
/// - url: `{domain}/blogs/{blog_id}`
#[get("/blogs/{blog_id}")]
pub async fn get_blog_by_id(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req
        .match_info()
        .query("blog_id")
        .parse::<i64>()
        .map_err(|_| AppError::Validation("invalid blog id".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let blog = app_state.blogs.get_blog_by_id(&ctx, blog_id)?;

    let response = match blog {
        Some(blog) => Response {
            message: "successfully fetched blog".to_string(),
            data: Some(blog),
        },
        None => Response {
            message: "blog not found".to_string(),
            data: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Pipe for liking a blog
/// - url: `{domain}/blogs/{blog_id}/like`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing a `user_id` key
#[post("/blogs/{blog_id}/like")]
pub async fn like_blog(
    req: HttpRequest,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req
        .match_info()
        .query("blog_id")
        .parse::<i64>()
        .map_err(|_| AppError::Validation("invalid blog id".to_string()))?;
    let request = serde_json::from_str::<LikeRequest>(&req_body)
        .map_err(|_| AppError::Validation("failed to process like request".to_string()))?;

    let ctx = Ctx::with_timeout(REQUEST_TIMEOUT);
    let like = app_state.blogs.like_blog(&ctx, blog_id, request.user_id)?;

    Ok(HttpResponse::Created().json(Response {
        message: "blog liked successfully".to_string(),
        data: Some(like),
    }))
}
