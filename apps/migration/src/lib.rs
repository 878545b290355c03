pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_author_table;
mod m20240601_000002_create_category_table;
mod m20240601_000003_create_tag_table;
mod m20240601_000004_create_post_table;
mod m20240601_000005_create_post_tag_table;
mod m20240601_000006_create_comment_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_author_table::Migration),
            Box::new(m20240601_000002_create_category_table::Migration),
            Box::new(m20240601_000003_create_tag_table::Migration),
            Box::new(m20240601_000004_create_post_table::Migration),
            Box::new(m20240601_000005_create_post_tag_table::Migration),
            Box::new(m20240601_000006_create_comment_table::Migration),
        ]
    }
}
