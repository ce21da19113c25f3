//! Add trigram indexes for substring search on terms and synonyms.
//!
//! `PostgreSQL` only; other backends skip this migration.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: [(&str, &str, &str); 4] = [
    ("idx_term_title_trgm", "term", "title"),
    ("idx_term_decod_en_trgm", "term", "decod_en"),
    ("idx_term_decod_pt_trgm", "term", "decod_pt"),
    ("idx_term_synonym_name_trgm", "term_synonym", "name"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        let conn = manager.get_connection();
        conn.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pg_trgm;")
            .await?;

        // ILIKE '%q%' lookups can use these instead of a sequential scan
        for (name, table, column) in INDEXES {
            conn.execute_unprepared(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON {table} USING GIN ({column} gin_trgm_ops);"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        for (name, _, _) in INDEXES {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP INDEX IF EXISTS {name};"))
                .await?;
        }

        Ok(())
    }
}
