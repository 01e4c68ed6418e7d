use std::fmt;

use thiserror::Error;

use crate::domain::comment::CommentId;
use crate::domain::post::PostId;
use crate::policy::Action;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("text must not be blank")]
    BlankText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Post,
    Comment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Post => f.write_str("post"),
            Entity::Comment => f.write_str("comment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("only the author can {0}")]
    Forbidden(Action),
    #[error("comment {comment_id} does not belong to post {post_id}")]
    Mismatch {
        comment_id: CommentId,
        post_id: PostId,
    },
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl BoardError {
    pub fn post_not_found(id: PostId) -> Self {
        BoardError::NotFound {
            entity: Entity::Post,
            id: id.get(),
        }
    }

    pub fn comment_not_found(id: CommentId) -> Self {
        BoardError::NotFound {
            entity: Entity::Comment,
            id: id.get(),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
