use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reader's message on a post. New comments start hidden
/// until the post's owner or an administrator makes them visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub name: Option<String>,
    pub message: String,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub name: Option<Option<String>>,
    pub message: Option<String>,
    pub is_visible: Option<bool>,
}

impl CommentChanges {
    /// Whether the change touches the content owned by the commenter.
    pub fn edits_content(&self) -> bool {
        self.name.is_some() || self.message.is_some()
    }
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, name: Option<String>, message: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            name,
            message,
            is_visible: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: CommentChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(message) = changes.message {
            self.message = message;
        }
        if let Some(is_visible) = changes.is_visible {
            self.is_visible = is_visible;
        }
        self.updated_at = Utc::now();
    }
}
