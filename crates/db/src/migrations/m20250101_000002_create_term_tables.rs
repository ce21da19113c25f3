//! Create term, synonym, image, link and video tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Term::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Term::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Term::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Term::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Term::DecodEn).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Term::DecodPt).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Term::Explanation).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Term::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Term::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_term_slug")
                    .table(Term::Table)
                    .col(Term::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: title (listing order)
        manager
            .create_index(
                Index::create()
                    .name("idx_term_title")
                    .table(Term::Table)
                    .col(Term::Title)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TermSynonym::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TermSynonym::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(TermSynonym::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(TermSynonym::Name).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_synonym_term")
                            .from(TermSynonym::Table, TermSynonym::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_term_synonym_term_name")
                    .table(TermSynonym::Table)
                    .col(TermSynonym::TermId)
                    .col(TermSynonym::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TermImage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TermImage::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(TermImage::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(TermImage::FileKey).string_len(512).not_null())
                    .col(ColumnDef::new(TermImage::AltText).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(TermImage::Title).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(TermImage::Caption).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(TermImage::DisplayOrder).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(TermImage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_image_term")
                            .from(TermImage::Table, TermImage::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (term_id, display_order) for gallery order
        manager
            .create_index(
                Index::create()
                    .name("idx_term_image_term_order")
                    .table(TermImage::Table)
                    .col(TermImage::TermId)
                    .col(TermImage::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TermLink::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TermLink::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(TermLink::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(TermLink::Url).text().not_null())
                    .col(ColumnDef::new(TermLink::Label).string_len(255).not_null().default(""))
                    .col(
                        ColumnDef::new(TermLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_link_term")
                            .from(TermLink::Table, TermLink::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_term_link_term_id")
                    .table(TermLink::Table)
                    .col(TermLink::TermId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TermVideo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TermVideo::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(TermVideo::TermId).string_len(32).not_null())
                    .col(ColumnDef::new(TermVideo::Url).text().not_null())
                    .col(ColumnDef::new(TermVideo::VideoId).string_len(20).not_null())
                    .col(
                        ColumnDef::new(TermVideo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_term_video_term")
                            .from(TermVideo::Table, TermVideo::TermId)
                            .to(Term::Table, Term::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_term_video_term_video")
                    .table(TermVideo::Table)
                    .col(TermVideo::TermId)
                    .col(TermVideo::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TermVideo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TermLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TermImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TermSynonym::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Term::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Term {
    Table,
    Id,
    Title,
    Slug,
    DecodEn,
    DecodPt,
    Explanation,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TermSynonym {
    Table,
    Id,
    TermId,
    Name,
}

#[derive(Iden)]
enum TermImage {
    Table,
    Id,
    TermId,
    FileKey,
    AltText,
    Title,
    Caption,
    DisplayOrder,
    CreatedAt,
}

#[derive(Iden)]
enum TermLink {
    Table,
    Id,
    TermId,
    Url,
    Label,
    CreatedAt,
}

#[derive(Iden)]
enum TermVideo {
    Table,
    Id,
    TermId,
    Url,
    VideoId,
    CreatedAt,
}
