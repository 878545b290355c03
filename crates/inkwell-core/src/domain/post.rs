use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, slugify};

/// Post entity - a single blog article. Always has an author; category and
/// tags are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    /// Unique URL name, derived from the title unless given explicitly.
    pub slug: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub time_read: Option<i32>,
    /// Tags are matched by name when the post is saved; unknown names are
    /// created in the same write.
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field changes applied to an existing post. `None` leaves a field alone;
/// for the nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub time_read: Option<Option<i32>>,
    pub category_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<Tag>>,
}

impl Post {
    /// Create a new post. The slug starts out derived from the title.
    pub fn new(author_id: Uuid, title: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: None,
            slug: slugify(&title),
            title,
            body,
            excerpt: None,
            time_read: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the tag set. Tags are kept unique by id and sorted by name.
    pub fn set_tags(&mut self, mut tags: Vec<Tag>) {
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        tags.dedup_by_key(|t| t.id);
        self.tags = tags;
    }

    /// Tag the post with names that may not exist yet.
    pub fn tag_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let tags = names
            .iter()
            .map(|name| Tag::new(name.as_ref().to_string()))
            .collect();
        self.set_tags(tags);
    }

    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(slug) = changes.slug {
            self.slug = slug;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(time_read) = changes.time_read {
            self.time_read = time_read;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(tags) = changes.tags {
            self.set_tags(tags);
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tags_sorts_and_dedups() {
        let mut post = Post::new(Uuid::new_v4(), "T".into(), "B".into());
        let web = Tag::new("web".into());
        let rust = Tag::new("rust".into());

        post.set_tags(vec![web.clone(), rust.clone(), web.clone()]);

        let names: Vec<_> = post.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "web"]);
        assert!(post.has_tag(web.id));
    }

    #[test]
    fn test_new_post_slug_follows_title() {
        let mut post = Post::new(Uuid::new_v4(), "Hello, Rust World!".into(), "B".into());
        assert_eq!(post.slug, "hello-rust-world");

        post.apply(PostChanges {
            title: Some("Renamed".into()),
            ..Default::default()
        });
        assert_eq!(post.slug, "hello-rust-world");
    }

    #[test]
    fn test_tag_names_builds_sorted_tags() {
        let mut post = Post::new(Uuid::new_v4(), "T".into(), "B".into());

        post.tag_names(&["web", "rust"]);

        let names: Vec<_> = post.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "web"]);
    }

    #[test]
    fn test_apply_partial_changes() {
        let category = Uuid::new_v4();
        let mut post = Post::new(Uuid::new_v4(), "Old".into(), "Body".into());
        post.category_id = Some(category);
        post.excerpt = Some("keep me".into());
        let before = post.updated_at;

        post.apply(PostChanges {
            title: Some("New".into()),
            category_id: Some(None),
            ..Default::default()
        });

        assert_eq!(post.title, "New");
        assert_eq!(post.body, "Body");
        assert_eq!(post.category_id, None);
        assert_eq!(post.excerpt.as_deref(), Some("keep me"));
        assert!(post.updated_at >= before);
    }
}
