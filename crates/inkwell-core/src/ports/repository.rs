use async_trait::async_trait;
use uuid::Uuid;

use super::query::{Page, PageRequest, PostFilter};
use crate::domain::{Author, Category, Comment, Post, Tag};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Author repository with domain-specific methods.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Find an author by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError>;

    /// Authors in registration order.
    async fn list(&self, page: PageRequest) -> Result<Page<Author>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Categories by `ordering`.
    async fn list(&self, page: PageRequest) -> Result<Page<Category>, RepoError>;

    async fn max_ordering(&self) -> Result<Option<i32>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    /// Tags by name.
    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, RepoError>;
}

/// Post repository. Saving a post resolves its tags by name, creating the
/// missing ones, and replaces its tag links in the same unit of work; a
/// rejected write leaves no tags behind.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts matching every supplied filter, in insertion order.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments of a post in creation order, hidden ones included.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
