use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_author_table::Author;
use crate::m20240601_000004_create_post_table::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

/// The `comments` table as created by this migration.
pub(crate) fn table() -> TableCreateStatement {
    Table::create()
        .table(Comment::Table)
        .if_not_exists()
        .col(ColumnDef::new(Comment::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Comment::PostId).uuid().not_null())
        .col(ColumnDef::new(Comment::AuthorId).uuid().not_null())
        .col(ColumnDef::new(Comment::Name).string_len(150))
        .col(ColumnDef::new(Comment::Message).text().not_null())
        .col(
            ColumnDef::new(Comment::IsVisible)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Comment::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Comment::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_comments_post_id")
                .from(Comment::Table, Comment::PostId)
                .to(Post::Table, Post::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_comments_author_id")
                .from(Comment::Table, Comment::AuthorId)
                .to(Author::Table, Author::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
pub enum Comment {
    #[sea_orm(iden = "comments")]
    Table,
    Id,
    PostId,
    AuthorId,
    Name,
    Message,
    IsVisible,
    CreatedAt,
    UpdatedAt,
}
