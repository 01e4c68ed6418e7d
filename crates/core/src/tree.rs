//! Comment tree maintenance.
//!
//! Replies hold foreign keys to their parents, so a subtree has to be removed
//! leaves first. Deletion walks the tree with an explicit stack: every branch
//! is removed in post-order and sibling branches are visited in ascending id
//! order. Stack usage does not grow with reply-chain depth.

use crate::domain::{Comment, CommentId, PostId};
use crate::error::BoardError;
use crate::store::{BoardStore, StoreResult};

enum Visit {
    Expand(CommentId),
    Remove(CommentId),
}

pub fn validate_parent_belongs_to_post(
    parent: &Comment,
    post_id: PostId,
) -> Result<(), BoardError> {
    if parent.post_id != post_id {
        return Err(BoardError::Mismatch {
            comment_id: parent.id,
            post_id,
        });
    }
    Ok(())
}

/// Deletes every reply beneath `comment_id`, but not the comment itself.
///
/// Returns the removed ids in removal order.
pub async fn delete_subtree<S>(store: &mut S, comment_id: CommentId) -> StoreResult<Vec<CommentId>>
where
    S: BoardStore,
{
    let mut stack = Vec::new();
    push_replies(store, comment_id, &mut stack).await?;
    drain(store, stack).await
}

/// Deletes every comment of `post_id`, replies included. The post itself is
/// left for the caller.
pub async fn delete_post_cascade<S>(store: &mut S, post_id: PostId) -> StoreResult<Vec<CommentId>>
where
    S: BoardStore,
{
    let roots = store.find_top_level_comments(post_id).await?;
    let stack = roots
        .into_iter()
        .rev()
        .map(|comment| Visit::Expand(comment.id))
        .collect();
    drain(store, stack).await
}

async fn push_replies<S>(
    store: &mut S,
    parent_id: CommentId,
    stack: &mut Vec<Visit>,
) -> StoreResult<()>
where
    S: BoardStore,
{
    let replies = store.find_replies(parent_id).await?;
    // reversed so the lowest id is popped first
    stack.extend(replies.into_iter().rev().map(|reply| Visit::Expand(reply.id)));
    Ok(())
}

async fn drain<S>(store: &mut S, mut stack: Vec<Visit>) -> StoreResult<Vec<CommentId>>
where
    S: BoardStore,
{
    let mut removed = Vec::new();
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Expand(id) => {
                stack.push(Visit::Remove(id));
                push_replies(store, id, &mut stack).await?;
            }
            Visit::Remove(id) => {
                store.delete_comment(id).await?;
                removed.push(id);
            }
        }
    }
    Ok(removed)
}
