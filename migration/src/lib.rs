pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users_and_programs;
mod m20251001_000002_create_passes_and_qr_codes;
mod m20251001_000003_create_pass_validations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users_and_programs::Migration),
            Box::new(m20251001_000002_create_passes_and_qr_codes::Migration),
            Box::new(m20251001_000003_create_pass_validations::Migration),
        ]
    }
}
