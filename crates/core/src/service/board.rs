//! Board use cases.
//!
//! Every operation runs in one unit of work. Mutations commit at the end, so
//! a cascade either removes the whole subtree and its target or nothing.

use tracing::info;

use crate::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId, PostPatch};
use crate::error::{BoardError, BoardResult};
use crate::policy::{Action, AuthorOnly, Caller, Policy, Resource};
use crate::store::{BoardRepository, BoardStore};
use crate::tree;
use crate::types::NonBlank;

const POST_FIELDS_REQUIRED: &str = "title and content are required";
const CONTENT_REQUIRED: &str = "content is required";

pub struct BoardService<R, P = AuthorOnly> {
    repo: R,
    policy: P,
}

impl<R: BoardRepository> BoardService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_policy(repo, AuthorOnly)
    }
}

impl<R: BoardRepository, P: Policy> BoardService<R, P> {
    pub fn with_policy(repo: R, policy: P) -> Self {
        Self { repo, policy }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        caller: &Caller,
    ) -> BoardResult<Post> {
        let (Ok(title), Ok(content)) = (NonBlank::try_from(title), NonBlank::try_from(content))
        else {
            return Err(BoardError::Validation(POST_FIELDS_REQUIRED));
        };
        let mut store = self.repo.begin().await?;
        let post = store
            .insert_post(NewPost {
                title,
                content,
                author: caller.as_str().to_string(),
            })
            .await?;
        store.commit().await?;
        info!(post_id = %post.id, author = %post.author, "post created");
        Ok(post)
    }

    pub async fn list_posts(&self) -> BoardResult<Vec<Post>> {
        let mut store = self.repo.begin().await?;
        Ok(store.list_posts().await?)
    }

    pub async fn get_post(&self, id: PostId) -> BoardResult<Post> {
        let mut store = self.repo.begin().await?;
        store
            .find_post(id)
            .await?
            .ok_or_else(|| BoardError::post_not_found(id))
    }

    pub async fn update_post(
        &self,
        id: PostId,
        patch: &PostPatch,
        caller: &Caller,
    ) -> BoardResult<Post> {
        let mut store = self.repo.begin().await?;
        let mut post = store
            .find_post(id)
            .await?
            .ok_or_else(|| BoardError::post_not_found(id))?;
        self.authorize(caller, Action::UpdatePost, Resource::Post(&post))?;
        if !patch.apply(&mut post) {
            return Ok(post);
        }
        let post = store.update_post(&post).await?;
        store.commit().await?;
        info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    /// Removes the post and its whole comment forest. Returns how many
    /// comments went with it.
    pub async fn delete_post(&self, id: PostId, caller: &Caller) -> BoardResult<usize> {
        let mut store = self.repo.begin().await?;
        let post = store
            .find_post(id)
            .await?
            .ok_or_else(|| BoardError::post_not_found(id))?;
        self.authorize(caller, Action::DeletePost, Resource::Post(&post))?;
        let removed = tree::delete_post_cascade(&mut store, id).await?;
        store.delete_post(id).await?;
        store.commit().await?;
        info!(post_id = %id, comments_removed = removed.len(), "post deleted");
        Ok(removed.len())
    }

    pub async fn list_comments(&self, post_id: PostId) -> BoardResult<Vec<Comment>> {
        let mut store = self.repo.begin().await?;
        if !store.post_exists(post_id).await? {
            return Err(BoardError::post_not_found(post_id));
        }
        Ok(store.find_top_level_comments(post_id).await?)
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        content: &str,
        caller: &Caller,
    ) -> BoardResult<Comment> {
        let mut store = self.repo.begin().await?;
        if !store.post_exists(post_id).await? {
            return Err(BoardError::post_not_found(post_id));
        }
        let content =
            NonBlank::try_from(content).map_err(|_| BoardError::Validation(CONTENT_REQUIRED))?;
        let comment = store
            .insert_comment(NewComment {
                post_id,
                parent_id: None,
                content,
                author: caller.as_str().to_string(),
            })
            .await?;
        store.commit().await?;
        info!(post_id = %post_id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    pub async fn list_replies(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> BoardResult<Vec<Comment>> {
        let mut store = self.repo.begin().await?;
        if !store.post_exists(post_id).await? {
            return Err(BoardError::post_not_found(post_id));
        }
        let parent = store
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| BoardError::comment_not_found(comment_id))?;
        tree::validate_parent_belongs_to_post(&parent, post_id)?;
        Ok(store.find_replies(comment_id).await?)
    }

    pub async fn add_reply(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
        caller: &Caller,
    ) -> BoardResult<Comment> {
        let mut store = self.repo.begin().await?;
        if !store.post_exists(post_id).await? {
            return Err(BoardError::post_not_found(post_id));
        }
        let parent = store
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| BoardError::comment_not_found(comment_id))?;
        tree::validate_parent_belongs_to_post(&parent, post_id)?;
        let content =
            NonBlank::try_from(content).map_err(|_| BoardError::Validation(CONTENT_REQUIRED))?;
        let reply = store
            .insert_comment(NewComment {
                post_id,
                parent_id: Some(parent.id),
                content,
                author: caller.as_str().to_string(),
            })
            .await?;
        store.commit().await?;
        info!(post_id = %post_id, parent_id = %parent.id, comment_id = %reply.id, "reply added");
        Ok(reply)
    }

    /// Removes the comment and every reply beneath it. Returns the number of
    /// comments removed, the target included.
    pub async fn delete_comment(
        &self,
        post_id: PostId,
        id: CommentId,
        caller: &Caller,
    ) -> BoardResult<usize> {
        let mut store = self.repo.begin().await?;
        let comment = store
            .find_comment(id)
            .await?
            .ok_or_else(|| BoardError::comment_not_found(id))?;
        tree::validate_parent_belongs_to_post(&comment, post_id)?;
        self.authorize(caller, Action::DeleteComment, Resource::Comment(&comment))?;
        let replies = tree::delete_subtree(&mut store, id).await?;
        store.delete_comment(id).await?;
        store.commit().await?;
        let removed = replies.len() + 1;
        info!(post_id = %post_id, comment_id = %id, removed, "comment deleted");
        Ok(removed)
    }

    fn authorize(
        &self,
        caller: &Caller,
        action: Action,
        resource: Resource<'_>,
    ) -> BoardResult<()> {
        if self.policy.can(caller, action, resource) {
            Ok(())
        } else {
            Err(BoardError::Forbidden(action))
        }
    }
}
