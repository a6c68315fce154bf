use std::sync::Arc;

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::db_utils::{get_conn, PgPool};
use crate::database::models::blog::Blog;
use crate::database::models::like::{BlogLike, CommentLike};
use crate::database::models::user::{NewUser, User, UserChanges, UserInsert, UserWithRelations};
use crate::database::tx::TxHandle;
use crate::schema::users;

/// Store contract for the user aggregate.
///
/// Operations taking a `tx` participate in the caller's transaction when
/// one is supplied; commit and rollback are then the caller's job. With
/// no handle the operation runs in its own auto-committing transaction.
pub trait UserRepository {
    type Tx;

    fn begin_tx(&self, ctx: &Ctx) -> Result<Self::Tx, AppError>;
    fn commit_tx(&self, ctx: &Ctx, tx: Self::Tx) -> Result<(), AppError>;
    fn rollback_tx(&self, ctx: &Ctx, tx: Self::Tx);

    fn create_user(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        user: NewUser,
    ) -> Result<User, AppError>;

    /// Finds a non-deleted user matching the username OR the email.
    /// Either match is enough; absence is `Ok(None)`, not an error.
    fn find_by_username_or_email(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError>;

    fn find_by_username(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        username: &str,
    ) -> Result<Option<User>, AppError>;

    /// Applies a field-level change set; `None` when no non-deleted row
    /// carries the id.
    fn update_user(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, AppError>;

    fn soft_delete_user(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        id: i64,
    ) -> Result<(), AppError>;

    /// All non-deleted users with their blogs, blog likes and comment
    /// likes fetched eagerly in the same logical read.
    fn get_all_users(&self, ctx: &Ctx) -> Result<Vec<UserWithRelations>, AppError>;

    fn get_user_by_username(
        &self,
        ctx: &Ctx,
        username: &str,
    ) -> Result<Option<UserWithRelations>, AppError>;
}

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl Clone for PgUserRepository {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> PgUserRepository {
        PgUserRepository { pool }
    }

    fn insert_user(&self, conn: &PgConnection, user: NewUser) -> Result<User, AppError> {
        let time = Utc::now().naive_utc();
        let record = UserInsert {
            name: user.name,
            username: user.username,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at: time,
            updated_at: time,
        };

        let created = diesel::insert_into(users::table)
            .values(&record)
            .get_result::<User>(conn)?;
        Ok(created)
    }

    fn select_by_username_or_email(
        &self,
        conn: &PgConnection,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let found = users::table
            .filter(users::deleted_at.is_null())
            .filter(users::username.eq(username).or(users::email.eq(email)))
            .first::<User>(conn)
            .optional()?;
        Ok(found)
    }

    fn select_by_username(
        &self,
        conn: &PgConnection,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let found = users::table
            .filter(users::deleted_at.is_null())
            .filter(users::username.eq(username))
            .first::<User>(conn)
            .optional()?;
        Ok(found)
    }

    fn apply_changes(
        &self,
        conn: &PgConnection,
        id: i64,
        mut changes: UserChanges,
    ) -> Result<Option<User>, AppError> {
        changes.updated_at = Some(Utc::now().naive_utc());
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::deleted_at.is_null()),
        )
        .set(&changes)
        .get_result::<User>(conn)
        .optional()?;
        Ok(updated)
    }

    fn mark_deleted(&self, conn: &PgConnection, id: i64) -> Result<(), AppError> {
        let time = Utc::now().naive_utc();
        diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::deleted_at.is_null()),
        )
        .set((users::deleted_at.eq(time), users::updated_at.eq(time)))
        .execute(conn)?;
        Ok(())
    }

    /// Hydrates the owned collections for a batch of users with one
    /// grouped query per relation.
    fn load_relations(
        &self,
        conn: &PgConnection,
        rows: Vec<User>,
    ) -> Result<Vec<UserWithRelations>, AppError> {
        use crate::schema::{blog_likes, blogs, comment_likes};

        let blogs = Blog::belonging_to(&rows)
            .filter(blogs::deleted_at.is_null())
            .load::<Blog>(conn)?
            .grouped_by(&rows);
        let blog_likes = BlogLike::belonging_to(&rows)
            .filter(blog_likes::deleted_at.is_null())
            .load::<BlogLike>(conn)?
            .grouped_by(&rows);
        let comment_likes = CommentLike::belonging_to(&rows)
            .filter(comment_likes::deleted_at.is_null())
            .load::<CommentLike>(conn)?
            .grouped_by(&rows);

        Ok(rows
            .into_iter()
            .zip(blogs)
            .zip(blog_likes)
            .zip(comment_likes)
            .map(
                |(((user, blogs), blog_likes), comment_likes)| UserWithRelations {
                    user,
                    blogs,
                    blog_likes,
                    comment_likes,
                },
            )
            .collect())
    }
}

impl UserRepository for PgUserRepository {
    type Tx = TxHandle;

    fn begin_tx(&self, ctx: &Ctx) -> Result<TxHandle, AppError> {
        TxHandle::begin(ctx, &self.pool)
    }

    fn commit_tx(&self, ctx: &Ctx, tx: TxHandle) -> Result<(), AppError> {
        tx.commit(ctx)
    }

    fn rollback_tx(&self, _ctx: &Ctx, tx: TxHandle) {
        tx.rollback();
    }

    fn create_user(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        user: NewUser,
    ) -> Result<User, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.insert_user(tx.conn(), user),
            None => self.insert_user(&*get_conn(&self.pool)?, user),
        }
    }

    fn find_by_username_or_email(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_by_username_or_email(tx.conn(), username, email),
            None => self.select_by_username_or_email(&*get_conn(&self.pool)?, username, email),
        }
    }

    fn find_by_username(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_by_username(tx.conn(), username),
            None => self.select_by_username(&*get_conn(&self.pool)?, username),
        }
    }

    fn update_user(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.apply_changes(tx.conn(), id, changes),
            None => self.apply_changes(&*get_conn(&self.pool)?, id, changes),
        }
    }

    fn soft_delete_user(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        id: i64,
    ) -> Result<(), AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.mark_deleted(tx.conn(), id),
            None => self.mark_deleted(&*get_conn(&self.pool)?, id),
        }
    }

    fn get_all_users(&self, ctx: &Ctx) -> Result<Vec<UserWithRelations>, AppError> {
        ctx.check()?;
        let conn = get_conn(&self.pool)?;

        let rows = users::table
            .filter(users::deleted_at.is_null())
            .order(users::id.asc())
            .load::<User>(&*conn)?;
        self.load_relations(&*conn, rows)
    }

    fn get_user_by_username(
        &self,
        ctx: &Ctx,
        username: &str,
    ) -> Result<Option<UserWithRelations>, AppError> {
        ctx.check()?;
        let conn = get_conn(&self.pool)?;

        match self.select_by_username(&*conn, username)? {
            Some(user) => {
                let mut hydrated = self.load_relations(&*conn, vec![user])?;
                Ok(hydrated.pop())
            }
            None => Ok(None),
        }
    }
}
