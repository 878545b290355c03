use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

/// The `categories` table as created by this migration.
pub(crate) fn table() -> TableCreateStatement {
    Table::create()
        .table(Category::Table)
        .if_not_exists()
        .col(ColumnDef::new(Category::Id).uuid().not_null().primary_key())
        .col(
            ColumnDef::new(Category::Name)
                .string_len(200)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Category::Slug)
                .string_len(255)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Category::Ordering)
                .integer()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Category::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}

#[derive(DeriveIden)]
pub enum Category {
    #[sea_orm(iden = "categories")]
    Table,
    Id,
    Name,
    Slug,
    Ordering,
    CreatedAt,
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::sea_query::PostgresQueryBuilder;

    use super::*;

    #[test]
    fn test_columns_fit_the_longest_accepted_values() {
        let sql = table().to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#""name" varchar(200) NOT NULL UNIQUE"#), "{sql}");
        assert!(sql.contains(r#""slug" varchar(255) NOT NULL UNIQUE"#), "{sql}");
    }
}
