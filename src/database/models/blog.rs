use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::database::models::comment::Comment;
use crate::database::models::like::BlogLike;
use crate::database::models::user::User;
use crate::schema::blogs;

#[derive(Debug, Queryable, Identifiable, Associations, Clone, Serialize, Deserialize)]
#[belongs_to(User)]
#[table_name = "blogs"]
pub struct Blog {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Insertable)]
#[table_name = "blogs"]
pub struct BlogInsert {
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A blog with its eagerly fetched comments and likes.
#[derive(Debug, Clone, Serialize)]
pub struct BlogWithRelations {
    #[serde(flatten)]
    pub blog: Blog,
    pub comments: Vec<Comment>,
    pub likes: Vec<BlogLike>,
}
