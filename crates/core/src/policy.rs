use std::fmt;

use crate::domain::{Comment, Post};

/// Authenticated identity of the current request, supplied by whatever
/// front door established it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller(String);

impl Caller {
    pub fn new(identity: impl Into<String>) -> Self {
        Caller(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    UpdatePost,
    DeletePost,
    DeleteComment,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::UpdatePost => f.write_str("edit this post"),
            Action::DeletePost => f.write_str("delete this post"),
            Action::DeleteComment => f.write_str("delete this comment"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Post(&'a Post),
    Comment(&'a Comment),
}

impl Resource<'_> {
    pub fn author(&self) -> &str {
        match self {
            Resource::Post(post) => &post.author,
            Resource::Comment(comment) => &comment.author,
        }
    }
}

pub trait Policy: Send + Sync {
    fn can(&self, caller: &Caller, action: Action, resource: Resource<'_>) -> bool;
}

/// Grants every mutation to the resource's author and nobody else.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorOnly;

impl Policy for AuthorOnly {
    fn can(&self, caller: &Caller, _action: Action, resource: Resource<'_>) -> bool {
        caller.as_str() == resource.author()
    }
}
