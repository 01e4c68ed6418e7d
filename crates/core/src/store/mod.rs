//! Storage contract for posts and comments.
//!
//! A [`BoardRepository`] hands out units of work ([`BoardStore`]). Writes made
//! through a unit of work become visible only when it is committed; dropping
//! it discards them. Stores never cascade: removing dependent comments before
//! their parents is the caller's job (see [`crate::tree`]).

pub mod memory;

use std::future::Future;

use thiserror::Error;

use crate::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};

pub use memory::{MemoryBoardRepository, MemoryBoardStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait BoardRepository: Send + Sync {
    type Store: BoardStore + Send;

    fn begin(&self) -> impl Future<Output = StoreResult<Self::Store>> + Send;

    fn backend_name(&self) -> &'static str;
}

pub trait BoardStore {
    /// Persists a new post, assigning its id and timestamps.
    fn insert_post(&mut self, post: NewPost) -> impl Future<Output = StoreResult<Post>> + Send;

    /// Persists title and content of an existing post and refreshes `updated_at`.
    fn update_post(&mut self, post: &Post) -> impl Future<Output = StoreResult<Post>> + Send;

    fn find_post(&mut self, id: PostId) -> impl Future<Output = StoreResult<Option<Post>>> + Send;

    fn post_exists(&mut self, id: PostId) -> impl Future<Output = StoreResult<bool>> + Send;

    fn delete_post(&mut self, id: PostId) -> impl Future<Output = StoreResult<()>> + Send;

    /// All posts, id ascending.
    fn list_posts(&mut self) -> impl Future<Output = StoreResult<Vec<Post>>> + Send;

    fn insert_comment(
        &mut self,
        comment: NewComment,
    ) -> impl Future<Output = StoreResult<Comment>> + Send;

    fn find_comment(
        &mut self,
        id: CommentId,
    ) -> impl Future<Output = StoreResult<Option<Comment>>> + Send;

    fn delete_comment(&mut self, id: CommentId) -> impl Future<Output = StoreResult<()>> + Send;

    /// Comments of `post_id` without a parent, id ascending.
    fn find_top_level_comments(
        &mut self,
        post_id: PostId,
    ) -> impl Future<Output = StoreResult<Vec<Comment>>> + Send;

    /// Direct replies of `parent_id`, id ascending.
    fn find_replies(
        &mut self,
        parent_id: CommentId,
    ) -> impl Future<Output = StoreResult<Vec<Comment>>> + Send;

    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send
    where
        Self: Sized;
}
