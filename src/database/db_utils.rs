use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use dotenv::dotenv;
use std::env;

use crate::app::AppError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Builds the connection pool for the hosted database.
/// Requires a `DATABASE_URL` variable in the environment when no
/// url override is given.
///
/// # Example
/// ```
/// let pool = psql_connect_to_db(None);
/// ```
pub fn psql_connect_to_db(url: Option<&str>) -> PgPool {
    dotenv().ok();

    let database_url = match url {
        Some(url) => url.to_string(),
        None => env::var("DATABASE_URL").expect("Environment variable: 'DATABASE_URL' not set"),
    };
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to build the database connection pool")
}

/// Checks a connection out of the pool, classifying checkout failures.
pub fn get_conn(pool: &PgPool) -> Result<PgPooledConn, AppError> {
    pool.get().map_err(|err| AppError::Pool(err.to_string()))
}
