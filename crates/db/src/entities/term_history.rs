//! Term history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a term's text fields taken right before an edit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "term_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub term_id: String,

    pub previous_title: String,

    pub previous_decod_en: String,

    pub previous_decod_pt: String,

    #[sea_orm(column_type = "Text")]
    pub previous_explanation: String,

    #[sea_orm(nullable)]
    pub changed_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::term::Entity",
        from = "Column::TermId",
        to = "super::term::Column::Id",
        on_delete = "Cascade"
    )]
    Term,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ChangedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    ChangedBy,
}

impl Related<super::term::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
