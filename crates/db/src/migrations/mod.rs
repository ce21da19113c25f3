//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_term_tables;
mod m20250101_000003_create_suggestion_tables;
mod m20250101_000004_create_history_tables;
mod m20250101_000005_create_site_setting_table;
mod m20250101_000006_add_trigram_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_term_tables::Migration),
            Box::new(m20250101_000003_create_suggestion_tables::Migration),
            Box::new(m20250101_000004_create_history_tables::Migration),
            Box::new(m20250101_000005_create_site_setting_table::Migration),
            Box::new(m20250101_000006_add_trigram_indexes::Migration),
        ]
    }
}
