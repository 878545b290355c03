//! The authenticated caller and the ownership rules applied to it.

use uuid::Uuid;

use super::{Comment, Post};
use crate::error::DomainError;

/// An authenticated author acting on the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub author_id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(author_id: Uuid, is_admin: bool) -> Self {
        Self {
            author_id,
            is_admin,
        }
    }

    fn allow(condition: bool) -> Result<(), DomainError> {
        if condition {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    pub fn ensure_admin(&self) -> Result<(), DomainError> {
        Self::allow(self.is_admin)
    }

    /// Only the post's author may edit it.
    pub fn ensure_can_update_post(&self, post: &Post) -> Result<(), DomainError> {
        Self::allow(post.author_id == self.author_id)
    }

    pub fn ensure_can_delete_post(&self, post: &Post) -> Result<(), DomainError> {
        Self::allow(post.author_id == self.author_id || self.is_admin)
    }

    pub fn ensure_can_update_author(&self, author_id: Uuid) -> Result<(), DomainError> {
        Self::allow(author_id == self.author_id)
    }

    /// Post owners and administrators moderate a post's comments.
    pub fn can_moderate(&self, post: &Post) -> bool {
        post.author_id == self.author_id || self.is_admin
    }

    pub fn ensure_can_delete_comment(&self, comment: &Comment, post: &Post) -> Result<(), DomainError> {
        Self::allow(comment.author_id == self.author_id || self.can_moderate(post))
    }
}

impl Comment {
    /// Visible comments are public; hidden ones are seen by their writer and
    /// by the post's moderators.
    pub fn is_visible_to(&self, actor: Option<&Actor>, post: &Post) -> bool {
        if self.is_visible {
            return true;
        }
        match actor {
            Some(actor) => actor.author_id == self.author_id || actor.can_moderate(post),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author_id: Uuid) -> Post {
        Post::new(author_id, "Title".into(), "Body".into())
    }

    #[test]
    fn test_only_owner_updates_post() {
        let owner = Actor::new(Uuid::new_v4(), false);
        let admin = Actor::new(Uuid::new_v4(), true);
        let post = post_by(owner.author_id);

        assert!(owner.ensure_can_update_post(&post).is_ok());
        assert!(matches!(
            admin.ensure_can_update_post(&post),
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn test_owner_or_admin_deletes_post() {
        let owner = Actor::new(Uuid::new_v4(), false);
        let admin = Actor::new(Uuid::new_v4(), true);
        let stranger = Actor::new(Uuid::new_v4(), false);
        let post = post_by(owner.author_id);

        assert!(owner.ensure_can_delete_post(&post).is_ok());
        assert!(admin.ensure_can_delete_post(&post).is_ok());
        assert!(stranger.ensure_can_delete_post(&post).is_err());
    }

    #[test]
    fn test_hidden_comment_visibility() {
        let owner = Actor::new(Uuid::new_v4(), false);
        let commenter = Actor::new(Uuid::new_v4(), false);
        let stranger = Actor::new(Uuid::new_v4(), false);
        let post = post_by(owner.author_id);
        let mut comment = Comment::new(post.id, commenter.author_id, None, "Hi".into());

        assert!(!comment.is_visible_to(None, &post));
        assert!(!comment.is_visible_to(Some(&stranger), &post));
        assert!(comment.is_visible_to(Some(&commenter), &post));
        assert!(comment.is_visible_to(Some(&owner), &post));

        comment.is_visible = true;
        assert!(comment.is_visible_to(None, &post));
    }
}
