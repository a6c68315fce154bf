pub mod blogs;
pub mod comments;
pub mod db_utils;
pub mod models;
pub mod tx;
pub mod users;
