use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NonBlank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub const fn new(value: i64) -> Self {
        PostId(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: NonBlank,
    pub content: NonBlank,
    pub author: String,
}

/// Partial edit of a post. Absent or blank fields leave the post untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl PostPatch {
    /// Returns true when at least one field changed.
    pub fn apply(&self, post: &mut Post) -> bool {
        let mut changed = false;
        if let Some(title) = non_blank(self.title.as_deref()) {
            if post.title != title {
                post.title = title.to_string();
                changed = true;
            }
        }
        if let Some(content) = non_blank(self.content.as_deref()) {
            if post.content != content {
                post.content = content.to_string();
                changed = true;
            }
        }
        changed
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Post, PostId, PostPatch};

    fn post() -> Post {
        let now = Utc::now();
        Post {
            id: PostId::new(1),
            title: "T".to_string(),
            content: "C".to_string(),
            author: "alice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn patch_ignores_blank_fields() {
        let mut post = post();
        let patch = PostPatch {
            title: Some("   ".to_string()),
            content: None,
        };
        assert!(!patch.apply(&mut post));
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
    }

    #[test]
    fn patch_updates_only_provided_fields() {
        let mut post = post();
        let patch = PostPatch {
            title: None,
            content: Some("new body".to_string()),
        };
        assert!(patch.apply(&mut post));
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "new body");
    }

    #[test]
    fn post_serializes_camel_case() {
        let value = serde_json::to_value(post()).unwrap();
        assert_eq!(value["id"], 1);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
