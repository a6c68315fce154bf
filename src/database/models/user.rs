use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::database::models::blog::Blog;
use crate::database::models::like::{BlogLike, CommentLike};
use crate::schema::users;

#[derive(Debug, Queryable, Identifiable, Clone, Serialize, Deserialize)]
#[table_name = "users"]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    ///Salted hash of the password, never the plaintext
    pub password: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Payload for creating a user. `password` carries the already-hashed
/// credential; the service hashes before handing it to the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct UserInsert {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Field-level change set for an update; a `None` field leaves the
/// stored column untouched. `password`, when present, is already hashed.
#[derive(AsChangeset, Debug, Clone, Default)]
#[table_name = "users"]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A user together with the collections it owns, fetched eagerly.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRelations {
    #[serde(flatten)]
    pub user: User,
    pub blogs: Vec<Blog>,
    pub blog_likes: Vec<BlogLike>,
    pub comment_likes: Vec<CommentLike>,
}
