//! Schema of the Yatube database.

pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_users_and_groups;
mod m20240301_000002_create_posts_and_comments;
mod m20240301_000003_create_follows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_and_groups::Migration),
            Box::new(m20240301_000002_create_posts_and_comments::Migration),
            Box::new(m20240301_000003_create_follows::Migration),
        ]
    }
}
