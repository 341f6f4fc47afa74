pub use sea_orm_migration::prelude::*;

mod m20240102_000001_create_catalog;
mod m20240102_000002_create_reviews;
mod m20240218_000001_create_contact;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240102_000001_create_catalog::Migration),
            Box::new(m20240102_000002_create_reviews::Migration),
            Box::new(m20240218_000001_create_contact::Migration),
        ]
    }
}
