use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BoardRepository, BoardStore, StoreError, StoreResult};
use crate::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};

#[derive(Debug, Default)]
struct MemoryState {
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    last_post_id: i64,
    last_comment_id: i64,
}

/// Process-local store. Units of work hold the state lock for their whole
/// lifetime, so they run one at a time.
#[derive(Debug, Clone, Default)]
pub struct MemoryBoardRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inverse of one write, replayed newest first when a unit of work is dropped
/// without committing.
#[derive(Debug)]
enum Undo {
    RemovePost(PostId),
    RestorePost(Post),
    RemoveComment(CommentId),
    RestoreComment(Comment),
}

/// Writes go straight to the locked state; the undo log is what makes them
/// revocable.
pub struct MemoryBoardStore {
    guard: OwnedMutexGuard<MemoryState>,
    undo: Vec<Undo>,
    ids_at_begin: (i64, i64),
}

impl BoardRepository for MemoryBoardRepository {
    type Store = MemoryBoardStore;

    async fn begin(&self) -> StoreResult<MemoryBoardStore> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let ids_at_begin = (guard.last_post_id, guard.last_comment_id);
        Ok(MemoryBoardStore {
            guard,
            undo: Vec::new(),
            ids_at_begin,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl MemoryBoardStore {
    fn rollback(&mut self) {
        let state = &mut *self.guard;
        while let Some(step) = self.undo.pop() {
            match step {
                Undo::RemovePost(id) => {
                    state.posts.remove(&id);
                }
                Undo::RestorePost(post) => {
                    state.posts.insert(post.id, post);
                }
                Undo::RemoveComment(id) => {
                    state.comments.remove(&id);
                }
                Undo::RestoreComment(comment) => {
                    state.comments.insert(comment.id, comment);
                }
            }
        }
        (state.last_post_id, state.last_comment_id) = self.ids_at_begin;
    }
}

impl Drop for MemoryBoardStore {
    fn drop(&mut self) {
        if !self.undo.is_empty() {
            self.rollback();
        }
    }
}

impl BoardStore for MemoryBoardStore {
    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post> {
        self.guard.last_post_id += 1;
        let id = PostId::new(self.guard.last_post_id);
        let now = Utc::now();
        let record = Post {
            id,
            title: post.title.into_inner(),
            content: post.content.into_inner(),
            author: post.author,
            created_at: now,
            updated_at: now,
        };
        self.guard.posts.insert(id, record.clone());
        self.undo.push(Undo::RemovePost(id));
        Ok(record)
    }

    async fn update_post(&mut self, post: &Post) -> StoreResult<Post> {
        let stored = self
            .guard
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| StoreError::Integrity(format!("post {} does not exist", post.id)))?;
        let previous = stored.clone();
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.updated_at = Utc::now();
        let updated = stored.clone();
        self.undo.push(Undo::RestorePost(previous));
        Ok(updated)
    }

    async fn find_post(&mut self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.guard.posts.get(&id).cloned())
    }

    async fn post_exists(&mut self, id: PostId) -> StoreResult<bool> {
        Ok(self.guard.posts.contains_key(&id))
    }

    async fn delete_post(&mut self, id: PostId) -> StoreResult<()> {
        if self.guard.comments.values().any(|c| c.post_id == id) {
            return Err(StoreError::Integrity(format!(
                "post {id} still has comments"
            )));
        }
        if let Some(removed) = self.guard.posts.remove(&id) {
            self.undo.push(Undo::RestorePost(removed));
        }
        Ok(())
    }

    async fn list_posts(&mut self) -> StoreResult<Vec<Post>> {
        Ok(self.guard.posts.values().cloned().collect())
    }

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment> {
        if !self.guard.posts.contains_key(&comment.post_id) {
            return Err(StoreError::Integrity(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        if let Some(parent_id) = comment.parent_id {
            if !self.guard.comments.contains_key(&parent_id) {
                return Err(StoreError::Integrity(format!(
                    "parent comment {parent_id} does not exist"
                )));
            }
        }
        self.guard.last_comment_id += 1;
        let id = CommentId::new(self.guard.last_comment_id);
        let record = Comment {
            id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            content: comment.content.into_inner(),
            author: comment.author,
            created_at: Utc::now(),
        };
        self.guard.comments.insert(id, record.clone());
        self.undo.push(Undo::RemoveComment(id));
        Ok(record)
    }

    async fn find_comment(&mut self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self.guard.comments.get(&id).cloned())
    }

    async fn delete_comment(&mut self, id: CommentId) -> StoreResult<()> {
        if self
            .guard
            .comments
            .values()
            .any(|c| c.parent_id == Some(id))
        {
            return Err(StoreError::Integrity(format!(
                "comment {id} still has replies"
            )));
        }
        if let Some(removed) = self.guard.comments.remove(&id) {
            self.undo.push(Undo::RestoreComment(removed));
        }
        Ok(())
    }

    async fn find_top_level_comments(&mut self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        Ok(self
            .guard
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.parent_id.is_none())
            .cloned()
            .collect())
    }

    async fn find_replies(&mut self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        Ok(self
            .guard
            .comments
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn commit(mut self) -> StoreResult<()> {
        self.undo.clear();
        self.ids_at_begin = (self.guard.last_post_id, self.guard.last_comment_id);
        Ok(())
    }
}
