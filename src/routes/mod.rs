use std::time::Duration;

pub mod blog;
pub mod comment;
pub mod user;

/// Deadline applied to every request's store work.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
