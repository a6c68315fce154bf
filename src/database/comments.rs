use std::sync::Arc;

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::db_utils::{get_conn, PgPool};
use crate::database::models::comment::{Comment, CommentInsert, CommentWithLikes, NewComment};
use crate::database::models::like::{CommentLike, CommentLikeInsert};
use crate::database::tx::TxHandle;
use crate::schema::{comment_likes, comments};

/// Store contract for the comment aggregate. Same transaction rules as
/// the user repository: a supplied handle is the caller's to close.
pub trait CommentRepository {
    type Tx;

    fn begin_tx(&self, ctx: &Ctx) -> Result<Self::Tx, AppError>;
    fn commit_tx(&self, ctx: &Ctx, tx: Self::Tx) -> Result<(), AppError>;
    fn rollback_tx(&self, ctx: &Ctx, tx: Self::Tx);

    /// All non-deleted comments with their likes fetched eagerly.
    fn get_all_comments(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
    ) -> Result<Vec<CommentWithLikes>, AppError>;

    fn create_blog_comment(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        comment: NewComment,
    ) -> Result<Comment, AppError>;

    fn get_comment_by_id(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        id: i64,
    ) -> Result<Option<CommentWithLikes>, AppError>;

    fn find_comment_like(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<CommentLike>, AppError>;

    fn create_comment_like(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLike, AppError>;
}

pub struct PgCommentRepository {
    pool: Arc<PgPool>,
}

impl Clone for PgCommentRepository {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl PgCommentRepository {
    pub fn new(pool: Arc<PgPool>) -> PgCommentRepository {
        PgCommentRepository { pool }
    }

    fn select_all(&self, conn: &PgConnection) -> Result<Vec<CommentWithLikes>, AppError> {
        let rows = comments::table
            .filter(comments::deleted_at.is_null())
            .order(comments::id.asc())
            .load::<Comment>(conn)?;
        self.load_likes(conn, rows)
    }

    fn insert_comment(
        &self,
        conn: &PgConnection,
        comment: NewComment,
    ) -> Result<Comment, AppError> {
        let time = Utc::now().naive_utc();
        let record = CommentInsert {
            user_id: comment.user_id,
            blog_id: comment.blog_id,
            body: comment.body,
            created_at: time,
            updated_at: time,
        };

        let created = diesel::insert_into(comments::table)
            .values(&record)
            .get_result::<Comment>(conn)?;
        Ok(created)
    }

    fn select_by_id(
        &self,
        conn: &PgConnection,
        id: i64,
    ) -> Result<Option<CommentWithLikes>, AppError> {
        let row = comments::table
            .filter(comments::deleted_at.is_null())
            .filter(comments::id.eq(id))
            .first::<Comment>(conn)
            .optional()?;

        match row {
            Some(comment) => {
                let mut hydrated = self.load_likes(conn, vec![comment])?;
                Ok(hydrated.pop())
            }
            None => Ok(None),
        }
    }

    fn select_like(
        &self,
        conn: &PgConnection,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<CommentLike>, AppError> {
        let found = comment_likes::table
            .filter(comment_likes::deleted_at.is_null())
            .filter(comment_likes::comment_id.eq(comment_id))
            .filter(comment_likes::user_id.eq(user_id))
            .first::<CommentLike>(conn)
            .optional()?;
        Ok(found)
    }

    fn insert_like(
        &self,
        conn: &PgConnection,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLike, AppError> {
        let time = Utc::now().naive_utc();
        let record = CommentLikeInsert {
            user_id,
            comment_id,
            created_at: time,
            updated_at: time,
        };

        let created = diesel::insert_into(comment_likes::table)
            .values(&record)
            .get_result::<CommentLike>(conn)?;
        Ok(created)
    }

    fn load_likes(
        &self,
        conn: &PgConnection,
        rows: Vec<Comment>,
    ) -> Result<Vec<CommentWithLikes>, AppError> {
        let likes = CommentLike::belonging_to(&rows)
            .filter(comment_likes::deleted_at.is_null())
            .load::<CommentLike>(conn)?
            .grouped_by(&rows);

        Ok(rows
            .into_iter()
            .zip(likes)
            .map(|(comment, likes)| CommentWithLikes { comment, likes })
            .collect())
    }
}

impl CommentRepository for PgCommentRepository {
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

    fn get_all_comments(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
    ) -> Result<Vec<CommentWithLikes>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_all(tx.conn()),
            None => self.select_all(&*get_conn(&self.pool)?),
        }
    }

    fn create_blog_comment(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        comment: NewComment,
    ) -> Result<Comment, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.insert_comment(tx.conn(), comment),
            None => self.insert_comment(&*get_conn(&self.pool)?, comment),
        }
    }

    fn get_comment_by_id(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        id: i64,
    ) -> Result<Option<CommentWithLikes>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_by_id(tx.conn(), id),
            None => self.select_by_id(&*get_conn(&self.pool)?, id),
        }
    }

    fn find_comment_like(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<CommentLike>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_like(tx.conn(), comment_id, user_id),
            None => self.select_like(&*get_conn(&self.pool)?, comment_id, user_id),
        }
    }

    fn create_comment_like(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLike, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.insert_like(tx.conn(), comment_id, user_id),
            None => self.insert_like(&*get_conn(&self.pool)?, comment_id, user_id),
        }
    }
}
