use threadboard_core::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};
use threadboard_core::store::{
    BoardRepository, BoardStore, MemoryBoardRepository, MemoryBoardStore, StoreResult,
};

use crate::db::{PgBoardRepository, PgBoardStore};

/// Storage backend picked at startup.
#[derive(Debug, Clone)]
pub enum BoardBackend {
    Memory(MemoryBoardRepository),
    Postgres(PgBoardRepository),
}

pub enum BoardBackendStore {
    Memory(MemoryBoardStore),
    Postgres(PgBoardStore),
}

macro_rules! dispatch {
    ($store:expr, $inner:ident => $call:expr) => {
        match $store {
            BoardBackendStore::Memory($inner) => $call,
            BoardBackendStore::Postgres($inner) => $call,
        }
    };
}

impl BoardRepository for BoardBackend {
    type Store = BoardBackendStore;

    async fn begin(&self) -> StoreResult<BoardBackendStore> {
        match self {
            BoardBackend::Memory(repo) => Ok(BoardBackendStore::Memory(repo.begin().await?)),
            BoardBackend::Postgres(repo) => Ok(BoardBackendStore::Postgres(repo.begin().await?)),
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            BoardBackend::Memory(repo) => repo.backend_name(),
            BoardBackend::Postgres(repo) => repo.backend_name(),
        }
    }
}

impl BoardStore for BoardBackendStore {
    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post> {
        dispatch!(self, store => store.insert_post(post).await)
    }

    async fn update_post(&mut self, post: &Post) -> StoreResult<Post> {
        dispatch!(self, store => store.update_post(post).await)
    }

    async fn find_post(&mut self, id: PostId) -> StoreResult<Option<Post>> {
        dispatch!(self, store => store.find_post(id).await)
    }

    async fn post_exists(&mut self, id: PostId) -> StoreResult<bool> {
        dispatch!(self, store => store.post_exists(id).await)
    }

    async fn delete_post(&mut self, id: PostId) -> StoreResult<()> {
        dispatch!(self, store => store.delete_post(id).await)
    }

    async fn list_posts(&mut self) -> StoreResult<Vec<Post>> {
        dispatch!(self, store => store.list_posts().await)
    }

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment> {
        dispatch!(self, store => store.insert_comment(comment).await)
    }

    async fn find_comment(&mut self, id: CommentId) -> StoreResult<Option<Comment>> {
        dispatch!(self, store => store.find_comment(id).await)
    }

    async fn delete_comment(&mut self, id: CommentId) -> StoreResult<()> {
        dispatch!(self, store => store.delete_comment(id).await)
    }

    async fn find_top_level_comments(&mut self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        dispatch!(self, store => store.find_top_level_comments(post_id).await)
    }

    async fn find_replies(&mut self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        dispatch!(self, store => store.find_replies(parent_id).await)
    }

    async fn commit(self) -> StoreResult<()> {
        dispatch!(self, store => store.commit().await)
    }
}
