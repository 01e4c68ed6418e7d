pub mod comment;
pub mod post;

pub use comment::{Comment, CommentId, NewComment};
pub use post::{NewPost, Post, PostId, PostPatch};
