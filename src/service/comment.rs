use serde::Deserialize;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::blogs::BlogRepository;
use crate::database::comments::CommentRepository;
use crate::database::models::comment::{Comment, CommentWithLikes, NewComment};
use crate::database::models::like::CommentLike;
use crate::service::{on_foreign_key_violation, on_unique_violation};

const BLOG_NOT_FOUND: &str = "blog not found";
const COMMENT_NOT_FOUND: &str = "comment not found";
const ALREADY_LIKED: &str = "comment already liked";

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub user_id: i64,
    pub body: String,
}

/// Comment orchestration. Generic over a comment and a blog repository
/// sharing one transaction type, so a blog existence check and the
/// comment write land in the same unit of work.
#[derive(Clone)]
pub struct CommentService<C, B>
where
    C: CommentRepository,
    B: BlogRepository<Tx = C::Tx>,
{
    comments: C,
    blogs: B,
}

impl<C, B> CommentService<C, B>
where
    C: CommentRepository,
    B: BlogRepository<Tx = C::Tx>,
{
    pub fn new(comments: C, blogs: B) -> CommentService<C, B> {
        CommentService { comments, blogs }
    }

    /// Creates a comment on a blog. The blog must exist at the time of
    /// the write; both the check and the insert run in one transaction.
    pub fn create_blog_comment(
        &self,
        ctx: &Ctx,
        blog_id: i64,
        request: CommentRequest,
    ) -> Result<Comment, AppError> {
        if request.body.trim().is_empty() {
            return Err(AppError::Validation("comment body is required".to_string()));
        }

        let tx = self.comments.begin_tx(ctx)?;
        match self.create_in_tx(ctx, &tx, blog_id, request) {
            Ok(created) => {
                self.comments.commit_tx(ctx, tx)?;
                Ok(created)
            }
            Err(err) => {
                self.comments.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn create_in_tx(
        &self,
        ctx: &Ctx,
        tx: &C::Tx,
        blog_id: i64,
        request: CommentRequest,
    ) -> Result<Comment, AppError> {
        if self.blogs.get_blog_by_id(ctx, Some(tx), blog_id)?.is_none() {
            return Err(AppError::Validation(BLOG_NOT_FOUND.to_string()));
        }

        self.comments
            .create_blog_comment(
                ctx,
                Some(tx),
                NewComment {
                    user_id: request.user_id,
                    blog_id,
                    body: request.body,
                },
            )
            .map_err(|err| on_foreign_key_violation(err, "unknown comment author"))
    }

    pub fn get_all_comments(&self, ctx: &Ctx) -> Result<Vec<CommentWithLikes>, AppError> {
        self.comments.get_all_comments(ctx, None)
    }

    pub fn get_comment_by_id(
        &self,
        ctx: &Ctx,
        id: i64,
    ) -> Result<Option<CommentWithLikes>, AppError> {
        self.comments.get_comment_by_id(ctx, None, id)
    }

    /// Records that a user liked a comment; liking twice is rejected.
    pub fn like_comment(
        &self,
        ctx: &Ctx,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLike, AppError> {
        let tx = self.comments.begin_tx(ctx)?;
        match self.like_in_tx(ctx, &tx, comment_id, user_id) {
            Ok(like) => {
                self.comments
                    .commit_tx(ctx, tx)
                    .map_err(|err| on_unique_violation(err, ALREADY_LIKED))?;
                Ok(like)
            }
            Err(err) => {
                self.comments.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn like_in_tx(
        &self,
        ctx: &Ctx,
        tx: &C::Tx,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLike, AppError> {
        if self
            .comments
            .get_comment_by_id(ctx, Some(tx), comment_id)?
            .is_none()
        {
            return Err(AppError::Validation(COMMENT_NOT_FOUND.to_string()));
        }
        if self
            .comments
            .find_comment_like(ctx, Some(tx), comment_id, user_id)?
            .is_some()
        {
            return Err(AppError::Validation(ALREADY_LIKED.to_string()));
        }

        self.comments
            .create_comment_like(ctx, Some(tx), comment_id, user_id)
            .map_err(|err| on_unique_violation(err, ALREADY_LIKED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use chrono::Utc;

    use crate::database::models::blog::{Blog, BlogWithRelations, NewBlog};
    use crate::database::models::like::BlogLike;

    /// Immediate-write fakes; transactional staging is covered by the
    /// user service tests.
    struct MemCommentRepo {
        comments: RefCell<Vec<Comment>>,
        likes: RefCell<Vec<CommentLike>>,
        next_id: Cell<i64>,
    }

    struct MemBlogRepo {
        blogs: RefCell<Vec<Blog>>,
    }

    impl MemCommentRepo {
        fn new() -> MemCommentRepo {
            MemCommentRepo {
                comments: RefCell::new(Vec::new()),
                likes: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }
        }
    }

    impl MemBlogRepo {
        fn with_blog(id: i64) -> MemBlogRepo {
            let time = Utc::now().naive_utc();
            MemBlogRepo {
                blogs: RefCell::new(vec![Blog {
                    id,
                    user_id: 1,
                    title: "First post".to_string(),
                    body: "hello".to_string(),
                    created_at: time,
                    updated_at: time,
                    deleted_at: None,
                }]),
            }
        }

        fn empty() -> MemBlogRepo {
            MemBlogRepo {
                blogs: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommentRepository for MemCommentRepo {
        type Tx = ();

        fn begin_tx(&self, ctx: &Ctx) -> Result<(), AppError> {
            ctx.check()
        }

        fn commit_tx(&self, ctx: &Ctx, _tx: ()) -> Result<(), AppError> {
            ctx.check()
        }

        fn rollback_tx(&self, _ctx: &Ctx, _tx: ()) {}

        fn get_all_comments(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
        ) -> Result<Vec<CommentWithLikes>, AppError> {
            ctx.check()?;
            Ok(self
                .comments
                .borrow()
                .iter()
                .cloned()
                .map(|comment| {
                    let likes = self
                        .likes
                        .borrow()
                        .iter()
                        .filter(|like| like.comment_id == comment.id)
                        .cloned()
                        .collect();
                    CommentWithLikes { comment, likes }
                })
                .collect())
        }

        fn create_blog_comment(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            comment: NewComment,
        ) -> Result<Comment, AppError> {
            ctx.check()?;
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let time = Utc::now().naive_utc();
            let row = Comment {
                id,
                user_id: comment.user_id,
                blog_id: comment.blog_id,
                body: comment.body,
                created_at: time,
                updated_at: time,
                deleted_at: None,
            };
            self.comments.borrow_mut().push(row.clone());
            Ok(row)
        }

        fn get_comment_by_id(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            id: i64,
        ) -> Result<Option<CommentWithLikes>, AppError> {
            ctx.check()?;
            Ok(self
                .comments
                .borrow()
                .iter()
                .find(|comment| comment.id == id)
                .cloned()
                .map(|comment| {
                    let likes = self
                        .likes
                        .borrow()
                        .iter()
                        .filter(|like| like.comment_id == comment.id)
                        .cloned()
                        .collect();
                    CommentWithLikes { comment, likes }
                }))
        }

        fn find_comment_like(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            comment_id: i64,
            user_id: i64,
        ) -> Result<Option<CommentLike>, AppError> {
            ctx.check()?;
            Ok(self
                .likes
                .borrow()
                .iter()
                .find(|like| like.comment_id == comment_id && like.user_id == user_id)
                .cloned())
        }

        fn create_comment_like(
            &self,
            ctx: &Ctx,
            _tx: Option<&()>,
            comment_id: i64,
            user_id: i64,
        ) -> Result<CommentLike, AppError> {
            ctx.check()?;
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let time = Utc::now().naive_utc();
            let like = CommentLike {
                id,
                user_id,
                comment_id,
                created_at: time,
                updated_at: time,
                deleted_at: None,
            };
            self.likes.borrow_mut().push(like.clone());
            Ok(like)
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
            _ctx: &Ctx,
            _tx: Option<&()>,
            _blog: NewBlog,
        ) -> Result<Blog, AppError> {
            unimplemented!("not exercised by comment tests")
        }

        fn get_all_blogs(&self, ctx: &Ctx) -> Result<Vec<BlogWithRelations>, AppError> {
            ctx.check()?;
            Ok(self
                .blogs
                .borrow()
                .iter()
                .cloned()
                .map(|blog| BlogWithRelations {
                    blog,
                    comments: Vec::new(),
                    likes: Vec::new(),
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
                .map(|blog| BlogWithRelations {
                    blog,
                    comments: Vec::new(),
                    likes: Vec::new(),
                }))
        }

        fn find_blog_like(
            &self,
            _ctx: &Ctx,
            _tx: Option<&()>,
            _blog_id: i64,
            _user_id: i64,
        ) -> Result<Option<BlogLike>, AppError> {
            unimplemented!("not exercised by comment tests")
        }

        fn create_blog_like(
            &self,
            _ctx: &Ctx,
            _tx: Option<&()>,
            _blog_id: i64,
            _user_id: i64,
        ) -> Result<BlogLike, AppError> {
            unimplemented!("not exercised by comment tests")
        }
    }

    #[test]
    fn comment_on_existing_blog_succeeds() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::with_blog(7));
        let ctx = Ctx::background();

        let comment = service
            .create_blog_comment(
                &ctx,
                7,
                CommentRequest {
                    user_id: 1,
                    body: "nice post".to_string(),
                },
            )
            .unwrap();

        assert_eq!(comment.blog_id, 7);
        assert_eq!(service.get_all_comments(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn comment_on_missing_blog_is_rejected() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::empty());
        let ctx = Ctx::background();

        let err = service
            .create_blog_comment(
                &ctx,
                7,
                CommentRequest {
                    user_id: 1,
                    body: "nice post".to_string(),
                },
            )
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.get_all_comments(&ctx).unwrap().is_empty());
    }

    #[test]
    fn empty_comment_body_is_rejected() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::with_blog(7));
        let ctx = Ctx::background();

        assert!(matches!(
            service.create_blog_comment(
                &ctx,
                7,
                CommentRequest {
                    user_id: 1,
                    body: " ".to_string(),
                },
            ),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn absent_comment_lookup_is_none_not_error() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::empty());
        let ctx = Ctx::background();

        assert!(service.get_comment_by_id(&ctx, 42).unwrap().is_none());
    }

    #[test]
    fn liking_a_comment_twice_is_rejected() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::with_blog(7));
        let ctx = Ctx::background();
        let comment = service
            .create_blog_comment(
                &ctx,
                7,
                CommentRequest {
                    user_id: 1,
                    body: "nice post".to_string(),
                },
            )
            .unwrap();

        service.like_comment(&ctx, comment.id, 2).unwrap();
        let err = service.like_comment(&ctx, comment.id, 2).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));

        let hydrated = service.get_comment_by_id(&ctx, comment.id).unwrap().unwrap();
        assert_eq!(hydrated.likes.len(), 1);
    }

    #[test]
    fn liking_a_missing_comment_is_rejected() {
        let service = CommentService::new(MemCommentRepo::new(), MemBlogRepo::with_blog(7));
        let ctx = Ctx::background();

        assert!(matches!(
            service.like_comment(&ctx, 42, 2),
            Err(AppError::Validation(_))
        ));
    }
}
