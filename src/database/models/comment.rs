use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::database::models::blog::Blog;
use crate::database::models::like::CommentLike;
use crate::database::models::user::User;
use crate::schema::comments;

#[derive(Debug, Queryable, Identifiable, Associations, Clone, Serialize, Deserialize)]
#[belongs_to(User)]
#[belongs_to(Blog)]
#[table_name = "comments"]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub blog_id: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: i64,
    pub blog_id: i64,
    pub body: String,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct CommentInsert {
    pub user_id: i64,
    pub blog_id: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A comment with its eagerly fetched likes.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithLikes {
    #[serde(flatten)]
    pub comment: Comment,
    pub likes: Vec<CommentLike>,
}
