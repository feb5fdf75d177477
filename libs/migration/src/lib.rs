pub use sea_orm_migration::prelude::*;

mod m20250110_000001_create_users;
mod m20250110_000002_create_categories_unities;
mod m20250110_000003_create_products;
mod m20250110_000004_create_commerce;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_create_users::Migration),
            Box::new(m20250110_000002_create_categories_unities::Migration),
            Box::new(m20250110_000003_create_products::Migration),
            Box::new(m20250110_000004_create_commerce::Migration),
        ]
    }
}
