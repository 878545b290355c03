//! In-memory store - used when no database is configured and in tests.
//!
//! Mirrors the relational schema: the same uniqueness rules, foreign keys and
//! cascades as the Postgres tables. Data is lost on process restart.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkwell_core::domain::{Author, Category, Comment, Post, Tag};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, Page, PageRequest,
    PostFilter, PostRepository, TagRepository,
};

/// Rows in insertion order. Posts keep only tag ids; names are joined in on read.
#[derive(Default)]
struct Tables {
    authors: Vec<Author>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.authors.iter().any(|a| a.id == post.author_id) {
            return Err(RepoError::Constraint("Author does not exist".into()));
        }
        if let Some(category_id) = post.category_id {
            if !self.categories.iter().any(|c| c.id == category_id) {
                return Err(RepoError::Constraint("Category does not exist".into()));
            }
        }
        if self
            .posts
            .iter()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(RepoError::Constraint(
                "A post with this slug already exists".into(),
            ));
        }
        Ok(())
    }

    /// Swap the post's tags for the stored ones of the same name, inserting
    /// the names not seen before. Runs only after the post row is accepted.
    fn resolve_tags(&mut self, post: &mut Post) {
        let mut resolved = Vec::with_capacity(post.tags.len());
        for wanted in &post.tags {
            let existing = self.tags.iter().find(|t| t.name == wanted.name).cloned();
            let tag = match existing {
                Some(tag) => tag,
                None => {
                    tracing::debug!(tag = %wanted.name, "Creating tag on demand");
                    self.tags.push(wanted.clone());
                    wanted.clone()
                }
            };
            resolved.push(tag);
        }
        post.set_tags(resolved);
    }

    fn check_author_unique(&self, author: &Author) -> Result<(), RepoError> {
        if self
            .authors
            .iter()
            .any(|a| a.id != author.id && a.email == author.email)
        {
            return Err(RepoError::Constraint(
                "An author with this email already exists".into(),
            ));
        }
        Ok(())
    }

    fn check_category_unique(&self, category: &Category) -> Result<(), RepoError> {
        for other in self.categories.iter().filter(|c| c.id != category.id) {
            if other.name == category.name {
                return Err(RepoError::Constraint(
                    "A category with this name already exists".into(),
                ));
            }
            if other.slug == category.slug {
                return Err(RepoError::Constraint(
                    "A category with this slug already exists".into(),
                ));
            }
            if other.ordering == category.ordering {
                return Err(RepoError::Constraint(
                    "A category with this ordering already exists".into(),
                ));
            }
        }
        Ok(())
    }

    fn check_tag_unique(&self, tag: &Tag) -> Result<(), RepoError> {
        if self
            .tags
            .iter()
            .any(|t| t.id != tag.id && t.name == tag.name)
        {
            return Err(RepoError::Constraint(
                "A tag with this name already exists".into(),
            ));
        }
        Ok(())
    }

    /// Re-read a post's tags from the tag table.
    fn hydrate(&self, post: &Post) -> Post {
        let tags = post
            .tags
            .iter()
            .filter_map(|t| self.tags.iter().find(|tag| tag.id == t.id).cloned())
            .collect();
        let mut post = post.clone();
        post.set_tags(tags);
        post
    }

    fn remove_post(&mut self, id: Uuid) {
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
    }
}

/// Shared in-memory tables behind one async [`RwLock`].
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn replace<T>(rows: &mut [T], matches: impl Fn(&T) -> bool, value: T) -> Result<(), RepoError> {
    match rows.iter_mut().find(|row| matches(row)) {
        Some(row) => {
            *row = value;
            Ok(())
        }
        None => Err(RepoError::NotFound),
    }
}

fn page_of<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    Page::new(page.slice(rows.iter().cloned()), rows.len() as u64, page)
}

macro_rules! memory_repository {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            store: Arc<InMemoryStore>,
        }

        impl $name {
            pub fn new(store: Arc<InMemoryStore>) -> Self {
                Self { store }
            }
        }
    };
}

memory_repository!(
    /// In-memory author repository.
    InMemoryAuthorRepository
);
memory_repository!(
    /// In-memory category repository.
    InMemoryCategoryRepository
);
memory_repository!(
    /// In-memory tag repository.
    InMemoryTagRepository
);
memory_repository!(
    /// In-memory post repository.
    InMemoryPostRepository
);
memory_repository!(
    /// In-memory comment repository.
    InMemoryCommentRepository
);

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryAuthorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.authors.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_author_unique(&author)?;
        tables.authors.push(author.clone());
        Ok(author)
    }

    async fn update(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_author_unique(&author)?;
        let id = author.id;
        replace(&mut tables.authors, |a| a.id == id, author.clone())?;
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.authors.len();
        tables.authors.retain(|a| a.id != id);
        if tables.authors.len() == before {
            return Err(RepoError::NotFound);
        }

        let owned: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.authors.iter().find(|a| a.email == email).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Author>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(page_of(&tables.authors, page))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_category_unique(&category)?;
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_category_unique(&category)?;
        let id = category.id;
        replace(&mut tables.categories, |c| c.id == id, category.clone())?;
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(RepoError::NotFound);
        }

        // ON DELETE SET NULL
        for post in tables.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Category>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut rows = tables.categories.clone();
        rows.sort_by_key(|c| (c.ordering, c.id));
        Ok(page_of(&rows, page))
    }

    async fn max_ordering(&self) -> Result<Option<i32>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.categories.iter().map(|c| c.ordering).max())
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryTagRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_tag_unique(&tag)?;
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn update(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_tag_unique(&tag)?;
        let id = tag.id;
        replace(&mut tables.tags, |t| t.id == id, tag.clone())?;
        Ok(tag)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        if tables.tags.len() == before {
            return Err(RepoError::NotFound);
        }

        for post in tables.posts.iter_mut() {
            post.tags.retain(|t| t.id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut rows = tables.tags.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page_of(&rows, page))
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.hydrate(p)))
    }

    async fn create(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_post_refs(&post)?;
        tables.resolve_tags(&mut post);
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post_refs(&post)?;
        tables.resolve_tags(&mut post);
        let id = post.id;
        replace(&mut tables.posts, |p| p.id == id, post.clone())?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        let matching: Vec<Post> = tables
            .posts
            .iter()
            .map(|p| tables.hydrate(p))
            .filter(|p| filter.matches(p))
            .collect();

        Ok(page_of(&matching, page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| tables.hydrate(p)))
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint("Post does not exist".into()));
        }
        if !tables.authors.iter().any(|a| a.id == comment.author_id) {
            return Err(RepoError::Constraint("Author does not exist".into()));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.store.tables.write().await;
        let id = comment.id;
        replace(&mut tables.comments, |c| c.id == id, comment.clone())?;
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}
