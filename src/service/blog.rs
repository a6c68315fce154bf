use serde::Deserialize;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::blogs::BlogRepository;
use crate::database::models::blog::{Blog, BlogWithRelations, NewBlog};
use crate::database::models::like::BlogLike;
use crate::service::{on_foreign_key_violation, on_unique_violation};

const BLOG_NOT_FOUND: &str = "blog not found";
const ALREADY_LIKED: &str = "blog already liked";

#[derive(Debug, Clone, Deserialize)]
pub struct BlogRequest {
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Clone)]
pub struct BlogService<B: BlogRepository> {
    repo: B,
}

impl<B: BlogRepository> BlogService<B> {
    pub fn new(repo: B) -> BlogService<B> {
        BlogService { repo }
    }

    /// Creates a blog. A single-statement write, so it runs in its own
    /// implicit transaction.
    pub fn create_new_blog(&self, ctx: &Ctx, request: BlogRequest) -> Result<Blog, AppError> {
        if request.title.trim().is_empty() {
            return Err(AppError::Validation("blog title is required".to_string()));
        }
        if request.body.trim().is_empty() {
            return Err(AppError::Validation("blog body is required".to_string()));
        }

        self.repo
            .create_blog(
                ctx,
                None,
                NewBlog {
                    user_id: request.user_id,
                    title: request.title,
                    body: request.body,
                },
            )
            .map_err(|err| on_foreign_key_violation(err, "unknown blog author"))
    }

    pub fn get_all_blogs(&self, ctx: &Ctx) -> Result<Vec<BlogWithRelations>, AppError> {
        self.repo.get_all_blogs(ctx)
    }

    pub fn get_blog_by_id(
        &self,
        ctx: &Ctx,
        id: i64,
    ) -> Result<Option<BlogWithRelations>, AppError> {
        self.repo.get_blog_by_id(ctx, None, id)
    }

    /// Records that a user liked a blog; liking twice is rejected.
    pub fn like_blog(&self, ctx: &Ctx, blog_id: i64, user_id: i64) -> Result<BlogLike, AppError> {
        let tx = self.repo.begin_tx(ctx)?;
        match self.like_in_tx(ctx, &tx, blog_id, user_id) {
            Ok(like) => {
                self.repo
                    .commit_tx(ctx, tx)
                    .map_err(|err| on_unique_violation(err, ALREADY_LIKED))?;
                Ok(like)
            }
            Err(err) => {
                self.repo.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn like_in_tx(
        &self,
        ctx: &Ctx,
        tx: &B::Tx,
        blog_id: i64,
        user_id: i64,
    ) -> Result<BlogLike, AppError> {
        if self.repo.get_blog_by_id(ctx, Some(tx), blog_id)?.is_none() {
            return Err(AppError::Validation(BLOG_NOT_FOUND.to_string()));
        }
        if self
            .repo
            .find_blog_like(ctx, Some(tx), blog_id, user_id)?
            .is_some()
        {
            return Err(AppError::Validation(ALREADY_LIKED.to_string()));
        }

        self.repo
            .create_blog_like(ctx, Some(tx), blog_id, user_id)
            .map_err(|err| on_unique_violation(err, ALREADY_LIKED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use chrono::Utc;

    struct MemBlogRepo {
        blogs: RefCell<Vec<Blog>>,
        likes: RefCell<Vec<BlogLike>>,
        next_id: Cell<i64>,
    }

    impl MemBlogRepo {
        fn new() -> MemBlogRepo {
            MemBlogRepo {
                blogs: RefCell::new(Vec::new()),
                likes: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }
        }
    }

    impl BlogRepository for MemBlogRepo {
        type Tx = ();

        fn begin_tx(&self, ctx: &Ctx) -> Result<(), AppError> {
            ctx.check()
        }

        fn commit_tx(&self, ctx: &Ctx, _tx: ()) -> Result<(), AppError> {
            ctx.check()
        }

        fn rollback_tx(&self, _ctx: &Ctx, _tx: ()) {}

        fn create_blog(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            blog: NewBlog,
        ) -> Result<Blog, AppError> {
            ctx.check()?;
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let time = Utc::now().naive_utc();
            let row = Blog {
                id,
                user_id: blog.user_id,
                title: blog.title,
                body: blog.body,
                created_at: time,
                updated_at: time,
                deleted_at: None,
            };
            self.blogs.borrow_mut().push(row.clone());
            Ok(row)
        }

        fn get_all_blogs(&self, ctx: &Ctx) -> Result<Vec<BlogWithRelations>, AppError> {
            ctx.check()?;
            Ok(self
                .blogs
                .borrow()
                .iter()
                .cloned()
                .map(|blog| {
                    let likes = self
                        .likes
                        .borrow()
                        .iter()
                        .filter(|like| like.blog_id == blog.id)
                        .cloned()
                        .collect();
                    BlogWithRelations {
                        blog,
                        comments: Vec::new(),
                        likes,
                    }
                })
                .collect())
        }

        fn get_blog_by_id(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            id: i64,
        ) -> Result<Option<BlogWithRelations>, AppError> {
            ctx.check()?;
            Ok(self
                .blogs
                .borrow()
                .iter()
                .find(|blog| blog.id == id)
                .cloned()
                .map(|blog| {
                    let likes = self
                        .likes
                        .borrow()
                        .iter()
                        .filter(|like| like.blog_id == blog.id)
                        .cloned()
                        .collect();
                    BlogWithRelations {
                        blog,
                        comments: Vec::new(),
                        likes,
                    }
                }))
        }

        fn find_blog_like(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            blog_id: i64,
            user_id: i64,
        ) -> Result<Option<BlogLike>, AppError> {
            ctx.check()?;
            Ok(self
                .likes
                .borrow()
                .iter()
                .find(|like| like.blog_id == blog_id && like.user_id == user_id)
                .cloned())
        }

        fn create_blog_like(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            blog_id: i64,
            user_id: i64,
        ) -> Result<BlogLike, AppError> {
            ctx.check()?;
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let time = Utc::now().naive_utc();
            let like = BlogLike {
                id,
                user_id,
                blog_id,
                created_at: time,
                updated_at: time,
                deleted_at: None,
            };
            self.likes.borrow_mut().push(like.clone());
            Ok(like)
        }
    }

    fn blog_request() -> BlogRequest {
        BlogRequest {
            user_id: 1,
            title: "First post".to_string(),
            body: "hello".to_string(),
        }
    }

    #[test]
    fn create_blog_succeeds() {
        let service = BlogService::new(MemBlogRepo::new());
        let ctx = Ctx::background();

        let blog = service.create_new_blog(&ctx, blog_request()).unwrap();

        assert_eq!(blog.title, "First post");
        assert_eq!(service.get_all_blogs(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn empty_title_or_body_is_rejected() {
        let service = BlogService::new(MemBlogRepo::new());
        let ctx = Ctx::background();

        let mut request = blog_request();
        request.title = String::new();
        assert!(matches!(
            service.create_new_blog(&ctx, request),
            Err(AppError::Validation(_))
        ));

        let mut request = blog_request();
        request.body = String::new();
        assert!(matches!(
            service.create_new_blog(&ctx, request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn absent_blog_lookup_is_none_not_error() {
        let service = BlogService::new(MemBlogRepo::new());
        let ctx = Ctx::background();

        assert!(service.get_blog_by_id(&ctx, 42).unwrap().is_none());
    }

    #[test]
    fn liking_a_blog_twice_is_rejected() {
        let service = BlogService::new(MemBlogRepo::new());
        let ctx = Ctx::background();
        let blog = service.create_new_blog(&ctx, blog_request()).unwrap();

        service.like_blog(&ctx, blog.id, 2).unwrap();
        let err = service.like_blog(&ctx, blog.id, 2).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));

        let hydrated = service.get_blog_by_id(&ctx, blog.id).unwrap().unwrap();
        assert_eq!(hydrated.likes.len(), 1);
    }

    #[test]
    fn liking_a_missing_blog_is_rejected() {
        let service = BlogService::new(MemBlogRepo::new());
        let ctx = Ctx::background();

        assert!(matches!(
            service.like_blog(&ctx, 42, 2),
            Err(AppError::Validation(_))
        ));
    }
}
