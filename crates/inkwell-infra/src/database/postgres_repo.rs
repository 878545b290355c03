//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use inkwell_core::domain::{Author, Category, Comment, Post, Tag};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, Page, PageRequest,
    PostFilter, PostRepository, TagRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, fetch_page, map_db_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => format!("{}***@{}", local.chars().next().unwrap_or('*'), domain),
            None => "***".to_string(),
        };
        tracing::debug!(author_email = %masked, "Finding author by email");

        let result = AuthorEntity::find()
            .filter(author::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "authors"))?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Author>, RepoError> {
        let select = AuthorEntity::find()
            .order_by_asc(author::Column::CreatedAt)
            .order_by_asc(author::Column::Id);

        fetch_page(self.db.as_ref(), select, page).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Category>, RepoError> {
        let select = CategoryEntity::find()
            .order_by_asc(category::Column::Ordering)
            .order_by_asc(category::Column::Id);

        fetch_page(self.db.as_ref(), select, page).await
    }

    async fn max_ordering(&self) -> Result<Option<i32>, RepoError> {
        let max = CategoryEntity::find()
            .select_only()
            .column_as(category::Column::Ordering.max(), "max_ordering")
            .into_tuple::<Option<i32>>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "categories"))?;

        Ok(max.flatten())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, RepoError> {
        let select = TagEntity::find()
            .order_by_asc(tag::Column::Name)
            .order_by_asc(tag::Column::Id);

        fetch_page(self.db.as_ref(), select, page).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "comments"))?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Insert the tag names not stored yet and return the stored tags for all
/// of them. Concurrent writers may add the same name; the unique index on
/// `tags.name` decides and the loser reads the winner's row.
pub(crate) async fn resolve_tags<C: ConnectionTrait>(
    conn: &C,
    tags: &[Tag],
) -> Result<Vec<Tag>, DbErr> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = tags.iter().cloned().map(tag::ActiveModel::from);
    TagEntity::insert_many(candidates)
        .on_conflict(
            OnConflict::column(tag::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let mut found: HashMap<String, Tag> = TagEntity::find()
        .filter(tag::Column::Name.is_in(tags.iter().map(|t| t.name.clone())))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| (model.name.clone(), Tag::from(model)))
        .collect();

    Ok(tags.iter().filter_map(|t| found.remove(&t.name)).collect())
}

/// Escape LIKE wildcards so the term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Translate a [`PostFilter`] into a WHERE condition: filters are ANDed,
/// the search term is ORed across title and body.
pub(crate) fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(author) = filter.author {
        condition = condition.add(post::Column::AuthorId.eq(author));
    }
    if let Some(category) = filter.category {
        condition = condition.add(post::Column::CategoryId.eq(category));
    }
    if let Some(tag) = filter.tag {
        condition = condition.add(
            post::Column::Id.in_subquery(
                Query::select()
                    .column(post_tag::Column::PostId)
                    .from(PostTagEntity)
                    .and_where(post_tag::Column::TagId.eq(tag))
                    .to_owned(),
            ),
        );
    }
    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let contains_term = |column: post::Column| {
            Expr::expr(Func::lower(Expr::col((PostEntity, column))))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        condition = condition.add(
            Condition::any()
                .add(contains_term(post::Column::Title))
                .add(contains_term(post::Column::Body)),
        );
    }

    condition
}

/// PostgreSQL post repository. A post row, the tags it introduces and its
/// `post_tags` links are written in one transaction.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }

    async fn load_tags(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
            .find_also_related(TagEntity)
            .all(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "post_tags"))?;

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                tags.entry(link.post_id).or_default().push(tag.into());
            }
        }
        Ok(tags)
    }

    async fn replace_tags<C: ConnectionTrait>(conn: &C, post: &Post) -> Result<(), DbErr> {
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(conn)
            .await?;

        if !post.tags.is_empty() {
            let links = post.tags.iter().map(|tag| post_tag::ActiveModel {
                post_id: Set(post.id),
                tag_id: Set(tag.id),
            });
            PostTagEntity::insert_many(links)
                .exec_without_returning(conn)
                .await?;
        }
        Ok(())
    }

    async fn write(&self, mut post: Post, is_new: bool) -> Result<Post, RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| map_db_err(e, "posts"))?;

        let tags = resolve_tags(&txn, &post.tags)
            .await
            .map_err(|e| map_db_err(e, "tags"))?;
        post.set_tags(tags);

        let active = post::ActiveModel::from(&post);
        let model = if is_new {
            active.insert(&txn).await
        } else {
            active.update(&txn).await
        }
        .map_err(|e| map_db_err(e, "posts"))?;

        Self::replace_tags(&txn, &post)
            .await
            .map_err(|e| map_db_err(e, "post_tags"))?;

        // Dropping the transaction on an early return rolls it back.
        txn.commit().await.map_err(|e| map_db_err(e, "posts"))?;

        Ok(model.into_domain(post.tags))
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "posts"))?
        else {
            return Ok(None);
        };

        let tags = self.load_tags(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(model.into_domain(tags)))
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        self.write(post, true).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.write(post, false).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // post_tags and comments go with the post (ON DELETE CASCADE)
        let result = PostEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "posts"))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find()
            .filter(post_condition(filter))
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id);

        let rows: Page<post::Model> = fetch_page(self.db.as_ref(), select, page).await?;

        let ids: Vec<Uuid> = rows.items.iter().map(|m| m.id).collect();
        let mut tags = self.load_tags(&ids).await?;

        tracing::debug!(total = rows.total, returned = ids.len(), "Listed posts");

        Ok(rows.map(|model| {
            let post_tags = tags.remove(&model.id).unwrap_or_default();
            model.into_domain(post_tags)
        }))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, "posts"))?
        else {
            return Ok(None);
        };

        let id = model.id;
        let tags = self.load_tags(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(model.into_domain(tags)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_empty_filter_matches_every_row() {
        let sql = PostEntity::find()
            .filter(post_condition(&PostFilter::default()))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.ends_with("WHERE TRUE"), "{sql}");
    }

    #[test]
    fn test_filter_condition_sql() {
        let filter = PostFilter {
            author: Some(Uuid::new_v4()),
            tag: Some(Uuid::new_v4()),
            search: Some("Rust".into()),
            ..Default::default()
        };

        let sql = PostEntity::find()
            .filter(post_condition(&filter))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""posts"."author_id" ="#), "{sql}");
        assert!(sql.contains(r#"IN (SELECT "post_id" FROM "post_tags""#), "{sql}");
        assert!(sql.contains(r#"LOWER("posts"."title") LIKE '%rust%' ESCAPE"#), "{sql}");
        assert!(sql.contains(r#"LOWER("posts"."body") LIKE '%rust%' ESCAPE"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(!sql.contains("category_id"), "{sql}");
    }
}
