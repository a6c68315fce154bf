use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::database::models::blog::Blog;
use crate::database::models::comment::Comment;
use crate::database::models::user::User;
use crate::schema::{blog_likes, comment_likes};

/// Join record linking a user to a blog they liked.
#[derive(Debug, Queryable, Identifiable, Associations, Clone, Serialize, Deserialize)]
#[belongs_to(User)]
#[belongs_to(Blog)]
#[table_name = "blog_likes"]
pub struct BlogLike {
    pub id: i64,
    pub user_id: i64,
    pub blog_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[table_name = "blog_likes"]
pub struct BlogLikeInsert {
    pub user_id: i64,
    pub blog_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Join record linking a user to a comment they liked.
#[derive(Debug, Queryable, Identifiable, Associations, Clone, Serialize, Deserialize)]
#[belongs_to(User)]
#[belongs_to(Comment)]
#[table_name = "comment_likes"]
pub struct CommentLike {
    pub id: i64,
    pub user_id: i64,
    pub comment_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[table_name = "comment_likes"]
pub struct CommentLikeInsert {
    pub user_id: i64,
    pub comment_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
