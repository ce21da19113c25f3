//! Create term history and suggestion application log tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TermHistory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TermHistory::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(TermHistory::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(TermHistory::PreviousTitle).string_len(255).not_null())
                    .col(
                        ColumnDef::new(TermHistory::PreviousDecodEn)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TermHistory::PreviousDecodPt)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TermHistory::PreviousExplanation)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(TermHistory::ChangedBy).string_len(32))
                    .col(
                        ColumnDef::new(TermHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_history_term")
                            .from(TermHistory::Table, TermHistory::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_history_user")
                            .from(TermHistory::Table, TermHistory::ChangedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (term_id, id) for newest-first history
        manager
            .create_index(
                Index::create()
                    .name("idx_term_history_term_id_id")
                    .table(TermHistory::Table)
                    .col(TermHistory::TermId)
                    .col(TermHistory::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuggestionApplicationLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::SuggestionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SuggestionApplicationLog::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(SuggestionApplicationLog::ApproverId).string_len(32))
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::FieldsChanged)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::MediaAdded)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::LinksAdded)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::VideosAdded)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SuggestionApplicationLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_log_suggestion")
                            .from(
                                SuggestionApplicationLog::Table,
                                SuggestionApplicationLog::SuggestionId,
                            )
                            .to(Suggestion::Table, Suggestion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_log_term")
                            .from(SuggestionApplicationLog::Table, SuggestionApplicationLog::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_log_approver")
                            .from(
                                SuggestionApplicationLog::Table,
                                SuggestionApplicationLog::ApproverId,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_application_log_created_at")
                    .table(SuggestionApplicationLog::Table)
                    .col(SuggestionApplicationLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuggestionApplicationLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TermHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Term {
    Table,
    Id,
}

#[derive(Iden)]
enum Suggestion {
    Table,
    Id,
}

#[derive(Iden)]
enum TermHistory {
    Table,
    Id,
    TermId,
    PreviousTitle,
    PreviousDecodEn,
    PreviousDecodPt,
    PreviousExplanation,
    ChangedBy,
    CreatedAt,
}

#[derive(Iden)]
enum SuggestionApplicationLog {
    Table,
    Id,
    SuggestionId,
    TermId,
    ApproverId,
    FieldsChanged,
    MediaAdded,
    LinksAdded,
    VideosAdded,
    Notes,
    CreatedAt,
}
