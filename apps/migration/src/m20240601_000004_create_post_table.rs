use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_author_table::Author;
use crate::m20240601_000002_create_category_table::Category;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(table()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_created_at")
                    .table(Post::Table)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

/// The `posts` table as created by this migration.
pub(crate) fn table() -> TableCreateStatement {
    Table::create()
        .table(Post::Table)
        .if_not_exists()
        .col(ColumnDef::new(Post::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Post::AuthorId).uuid().not_null())
        .col(ColumnDef::new(Post::CategoryId).uuid())
        .col(ColumnDef::new(Post::Title).string_len(200).not_null())
        .col(
            ColumnDef::new(Post::Slug)
                .string_len(255)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Post::Body).text().not_null())
        .col(ColumnDef::new(Post::Excerpt).text())
        .col(ColumnDef::new(Post::TimeRead).integer())
        .col(
            ColumnDef::new(Post::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Post::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_author_id")
                .from(Post::Table, Post::AuthorId)
                .to(Author::Table, Author::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_category_id")
                .from(Post::Table, Post::CategoryId)
                .to(Category::Table, Category::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
pub enum Post {
    #[sea_orm(iden = "posts")]
    Table,
    Id,
    AuthorId,
    CategoryId,
    Title,
    Slug,
    Body,
    Excerpt,
    TimeRead,
    CreatedAt,
    UpdatedAt,
}
