//! Term entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A glossary entry. Listings are ordered by title.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "term")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Acronym or word as displayed.
    pub title: String,

    /// URL key derived from the title when the term is created. Never changes.
    #[sea_orm(unique)]
    pub slug: String,

    /// English decoding.
    pub decod_en: String,

    /// Portuguese decoding.
    pub decod_pt: String,

    #[sea_orm(column_type = "Text")]
    pub explanation: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::term_synonym::Entity")]
    Synonyms,

    #[sea_orm(has_many = "super::term_image::Entity")]
    Images,

    #[sea_orm(has_many = "super::term_link::Entity")]
    Links,

    #[sea_orm(has_many = "super::term_video::Entity")]
    Videos,

    #[sea_orm(has_many = "super::term_history::Entity")]
    History,
}

impl Related<super::term_synonym::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Synonyms.def()
    }
}

impl Related<super::term_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::term_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::term_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl Related<super::term_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
