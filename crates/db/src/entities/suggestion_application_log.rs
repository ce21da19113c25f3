//! Suggestion application log entity.
//!
//! One row per approval that actually changed a term. Rows are never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suggestion_application_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub suggestion_id: String,

    pub term_id: String,

    #[sea_orm(nullable)]
    pub approver_id: Option<String>,

    /// JSON array of changed field names, e.g. `["decod_pt"]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub fields_changed: Json,

    pub media_added: i32,

    pub links_added: i32,

    pub videos_added: i32,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suggestion::Entity",
        from = "Column::SuggestionId",
        to = "super::suggestion::Column::Id",
        on_delete = "Cascade"
    )]
    Suggestion,

    #[sea_orm(
        belongs_to = "super::term::Entity",
        from = "Column::TermId",
        to = "super::term::Column::Id",
        on_delete = "Cascade"
    )]
    Term,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApproverId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,
}

impl Related<super::suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestion.def()
    }
}

impl Related<super::term::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Changed field names as strings.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<String> {
        self.fields_changed
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
