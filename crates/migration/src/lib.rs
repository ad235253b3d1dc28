pub use sea_orm_migration::prelude::*;

mod m20260110_000001_ledger;
mod m20260117_000002_rooms;
mod m20260124_000003_recurring;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_ledger::Migration),
            Box::new(m20260117_000002_rooms::Migration),
            Box::new(m20260124_000003_recurring::Migration),
        ]
    }
}
