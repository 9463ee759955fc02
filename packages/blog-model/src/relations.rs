//! Parent-to-children navigation.
//!
//! Child sequences are read from the store on every call, so they always
//! reflect what is persisted right now.

use blog_store::table::Direction;
use blog_store::DbError;

use crate::comment::{Comment, CommentFilter, CommentOrder};
use crate::entity::Entity;
use crate::post::{Post, PostFilter, PostOrder};
use crate::schema::POSTS;
use crate::user::User;
use crate::Blog;

impl User {
    /// Posts written by this user, in creation order.
    pub fn posts(&self, blog: &Blog) -> Result<Vec<Post>, DbError> {
        Post::find(blog, PostFilter::by_author(self))
            .order_by(PostOrder::Id, Direction::Asc)
            .fetch()
    }
}

impl Post {
    /// Comments on this post, in creation order.
    pub fn comments(&self, blog: &Blog) -> Result<Vec<Comment>, DbError> {
        Comment::find(blog, CommentFilter::by_post(self))
            .order_by(CommentOrder::Id, Direction::Asc)
            .fetch()
    }

    /// Saves a new comment on this post and returns it.
    ///
    /// Fails with `RecordNotFound` if the post is unsaved or was deleted.
    pub fn add_comment(
        &self,
        blog: &Blog,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Comment, DbError> {
        let id = self.persisted_id()?;
        if blog.database().get(POSTS, id)?.is_none() {
            return Err(DbError::RecordNotFound {
                table: POSTS.to_string(),
                id,
            });
        }

        let mut comment = Comment::new(self, author, content);
        comment.save(blog)?;
        tracing::debug!("Added comment {:?} to post {}", comment.id, id);
        Ok(comment)
    }
}
