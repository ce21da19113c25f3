//! Create suggestion tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suggestion::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suggestion::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Suggestion::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Suggestion::TermId).string_len(32))
                    .col(ColumnDef::new(Suggestion::Title).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Suggestion::DecodEn).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Suggestion::DecodPt).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Suggestion::Explanation).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Suggestion::ChangeType)
                            .string_len(20)
                            .not_null()
                            .default("complement"),
                    )
                    .col(ColumnDef::new(Suggestion::Justification).text().not_null().default(""))
                    .col(ColumnDef::new(Suggestion::SourceUrl).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Suggestion::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Suggestion::AdminNotes).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Suggestion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Suggestion::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_user")
                            .from(Suggestion::Table, Suggestion::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_term")
                            .from(Suggestion::Table, Suggestion::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (status, created_at) for the moderation queue
        manager
            .create_index(
                Index::create()
                    .name("idx_suggestion_status_created_at")
                    .table(Suggestion::Table)
                    .col(Suggestion::Status)
                    .col(Suggestion::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_suggestion_user_id")
                    .table(Suggestion::Table)
                    .col(Suggestion::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuggestionImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuggestionImage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuggestionImage::SuggestionId).string_len(32).not_null())
                    .col(ColumnDef::new(SuggestionImage::FileKey).string_len(512).not_null())
                    .col(
                        ColumnDef::new(SuggestionImage::AltText)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SuggestionImage::Title).string_len(255).not_null().default(""))
                    .col(
                        ColumnDef::new(SuggestionImage::Caption)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SuggestionImage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_image_suggestion")
                            .from(SuggestionImage::Table, SuggestionImage::SuggestionId)
                            .to(Suggestion::Table, Suggestion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_suggestion_image_key")
                    .table(SuggestionImage::Table)
                    .col(SuggestionImage::SuggestionId)
                    .col(SuggestionImage::FileKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuggestionLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuggestionLink::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuggestionLink::SuggestionId).string_len(32).not_null())
                    .col(ColumnDef::new(SuggestionLink::Url).text().not_null())
                    .col(ColumnDef::new(SuggestionLink::Label).string_len(255).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_link_suggestion")
                            .from(SuggestionLink::Table, SuggestionLink::SuggestionId)
                            .to(Suggestion::Table, Suggestion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_suggestion_link_url")
                    .table(SuggestionLink::Table)
                    .col(SuggestionLink::SuggestionId)
                    .col(SuggestionLink::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuggestionVideo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuggestionVideo::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuggestionVideo::SuggestionId).string_len(32).not_null())
                    .col(ColumnDef::new(SuggestionVideo::Url).text().not_null())
                    .col(ColumnDef::new(SuggestionVideo::VideoId).string_len(20).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_video_suggestion")
                            .from(SuggestionVideo::Table, SuggestionVideo::SuggestionId)
                            .to(Suggestion::Table, Suggestion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_suggestion_video_id")
                    .table(SuggestionVideo::Table)
                    .col(SuggestionVideo::SuggestionId)
                    .col(SuggestionVideo::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuggestionVideo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SuggestionLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SuggestionImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suggestion::Table).to_owned())
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
    UserId,
    TermId,
    Title,
    DecodEn,
    DecodPt,
    Explanation,
    ChangeType,
    Justification,
    SourceUrl,
    Status,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SuggestionImage {
    Table,
    Id,
    SuggestionId,
    FileKey,
    AltText,
    Title,
    Caption,
    CreatedAt,
}

#[derive(Iden)]
enum SuggestionLink {
    Table,
    Id,
    SuggestionId,
    Url,
    Label,
}

#[derive(Iden)]
enum SuggestionVideo {
    Table,
    Id,
    SuggestionId,
    Url,
    VideoId,
}
