use std::sync::Arc;

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::db_utils::{get_conn, PgPool};
use crate::database::models::blog::{Blog, BlogInsert, BlogWithRelations, NewBlog};
use crate::database::models::comment::Comment;
use crate::database::models::like::{BlogLike, BlogLikeInsert};
use crate::database::tx::TxHandle;
use crate::schema::{blog_likes, blogs, comments};

/// Store contract for the blog aggregate.
pub trait BlogRepository {
    type Tx;

    fn begin_tx(&self, ctx: &Ctx) -> Result<Self::Tx, AppError>;
    fn commit_tx(&self, ctx: &Ctx, tx: Self::Tx) -> Result<(), AppError>;
    fn rollback_tx(&self, ctx: &Ctx, tx: Self::Tx);

    fn create_blog(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        blog: NewBlog,
    ) -> Result<Blog, AppError>;

    /// All non-deleted blogs with comments and likes fetched eagerly.
    fn get_all_blogs(&self, ctx: &Ctx) -> Result<Vec<BlogWithRelations>, AppError>;

    fn get_blog_by_id(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        id: i64,
    ) -> Result<Option<BlogWithRelations>, AppError>;

    fn find_blog_like(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        blog_id: i64,
        user_id: i64,
    ) -> Result<Option<BlogLike>, AppError>;

    fn create_blog_like(
        &self,
        ctx: &Ctx,
        tx: Option<&Self::Tx>,
        blog_id: i64,
        user_id: i64,
    ) -> Result<BlogLike, AppError>;
}

pub struct PgBlogRepository {
    pool: Arc<PgPool>,
}

impl Clone for PgBlogRepository {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl PgBlogRepository {
    pub fn new(pool: Arc<PgPool>) -> PgBlogRepository {
        PgBlogRepository { pool }
    }

    fn insert_blog(&self, conn: &PgConnection, blog: NewBlog) -> Result<Blog, AppError> {
        let time = Utc::now().naive_utc();
        let record = BlogInsert {
            user_id: blog.user_id,
            title: blog.title,
            body: blog.body,
            created_at: time,
            updated_at: time,
        };

        let created = diesel::insert_into(blogs::table)
            .values(&record)
            .get_result::<Blog>(conn)?;
        Ok(created)
    }

    fn select_by_id(
        &self,
        conn: &PgConnection,
        id: i64,
    ) -> Result<Option<BlogWithRelations>, AppError> {
        let row = blogs::table
            .filter(blogs::deleted_at.is_null())
            .filter(blogs::id.eq(id))
            .first::<Blog>(conn)
            .optional()?;

        match row {
            Some(blog) => {
                let mut hydrated = self.load_relations(conn, vec![blog])?;
                Ok(hydrated.pop())
            }
            None => Ok(None),
        }
    }

    fn select_like(
        &self,
        conn: &PgConnection,
        blog_id: i64,
        user_id: i64,
    ) -> Result<Option<BlogLike>, AppError> {
        let found = blog_likes::table
            .filter(blog_likes::deleted_at.is_null())
            .filter(blog_likes::blog_id.eq(blog_id))
            .filter(blog_likes::user_id.eq(user_id))
            .first::<BlogLike>(conn)
            .optional()?;
        Ok(found)
    }

    fn insert_like(
        &self,
        conn: &PgConnection,
        blog_id: i64,
        user_id: i64,
    ) -> Result<BlogLike, AppError> {
        let time = Utc::now().naive_utc();
        let record = BlogLikeInsert {
            user_id,
            blog_id,
            created_at: time,
            updated_at: time,
        };

        let created = diesel::insert_into(blog_likes::table)
            .values(&record)
            .get_result::<BlogLike>(conn)?;
        Ok(created)
    }

    fn load_relations(
        &self,
        conn: &PgConnection,
        rows: Vec<Blog>,
    ) -> Result<Vec<BlogWithRelations>, AppError> {
        let blog_comments = Comment::belonging_to(&rows)
            .filter(comments::deleted_at.is_null())
            .load::<Comment>(conn)?
            .grouped_by(&rows);
        let likes = BlogLike::belonging_to(&rows)
            .filter(blog_likes::deleted_at.is_null())
            .load::<BlogLike>(conn)?
            .grouped_by(&rows);

        Ok(rows
            .into_iter()
            .zip(blog_comments)
            .zip(likes)
            .map(|((blog, comments), likes)| BlogWithRelations {
                blog,
                comments,
                likes,
            })
            .collect())
    }
}

impl BlogRepository for PgBlogRepository {
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

    fn create_blog(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        blog: NewBlog,
    ) -> Result<Blog, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.insert_blog(tx.conn(), blog),
            None => self.insert_blog(&*get_conn(&self.pool)?, blog),
        }
    }

    fn get_all_blogs(&self, ctx: &Ctx) -> Result<Vec<BlogWithRelations>, AppError> {
        ctx.check()?;
        let conn = get_conn(&self.pool)?;

        let rows = blogs::table
            .filter(blogs::deleted_at.is_null())
            .order(blogs::id.asc())
            .load::<Blog>(&*conn)?;
        self.load_relations(&*conn, rows)
    }

    fn get_blog_by_id(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        id: i64,
    ) -> Result<Option<BlogWithRelations>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_by_id(tx.conn(), id),
            None => self.select_by_id(&*get_conn(&self.pool)?, id),
        }
    }

    fn find_blog_like(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        blog_id: i64,
        user_id: i64,
    ) -> Result<Option<BlogLike>, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.select_like(tx.conn(), blog_id, user_id),
            None => self.select_like(&*get_conn(&self.pool)?, blog_id, user_id),
        }
    }

    fn create_blog_like(
        &self,
        ctx: &Ctx,
        tx: Option<&TxHandle>,
        blog_id: i64,
        user_id: i64,
    ) -> Result<BlogLike, AppError> {
        ctx.check()?;
        match tx {
            Some(tx) => self.insert_like(tx.conn(), blog_id, user_id),
            None => self.insert_like(&*get_conn(&self.pool)?, blog_id, user_id),
        }
    }
}
