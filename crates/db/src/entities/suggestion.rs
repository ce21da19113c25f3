//! Suggestion entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation state of a suggestion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl SuggestionStatus {
    /// Parse the lowercase wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// What kind of change the author proposes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "complement")]
    #[default]
    Complement,
    #[sea_orm(string_value = "correction")]
    Correction,
    #[sea_orm(string_value = "media")]
    Media,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ChangeType {
    /// Change types that touch content an existing term may already have.
    #[must_use]
    pub const fn needs_justification(self) -> bool {
        matches!(self, Self::Correction | Self::Complement | Self::Media)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suggestion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author.
    pub user_id: String,

    /// Target term; `None` proposes a new term. Cleared if the term is deleted.
    #[sea_orm(nullable)]
    pub term_id: Option<String>,

    pub title: String,

    pub decod_en: String,

    pub decod_pt: String,

    #[sea_orm(column_type = "Text")]
    pub explanation: String,

    pub change_type: ChangeType,

    #[sea_orm(column_type = "Text")]
    pub justification: String,

    #[sea_orm(column_type = "Text")]
    pub source_url: String,

    pub status: SuggestionStatus,

    #[sea_orm(column_type = "Text")]
    pub admin_notes: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::term::Entity",
        from = "Column::TermId",
        to = "super::term::Column::Id",
        on_delete = "SetNull"
    )]
    Term,

    #[sea_orm(has_many = "super::suggestion_image::Entity")]
    Images,

    #[sea_orm(has_many = "super::suggestion_link::Entity")]
    Links,

    #[sea_orm(has_many = "super::suggestion_video::Entity")]
    Videos,

    #[sea_orm(has_many = "super::suggestion_application_log::Entity")]
    ApplicationLogs,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::term::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl Related<super::suggestion_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::suggestion_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::suggestion_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl Related<super::suggestion_application_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplicationLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(SuggestionStatus::parse("Approved"), Some(SuggestionStatus::Approved));
        assert_eq!(SuggestionStatus::parse("unknown"), None);
    }

    #[test]
    fn test_change_type_defaults_to_complement() {
        assert_eq!(ChangeType::default(), ChangeType::Complement);
        assert!(ChangeType::Media.needs_justification());
        assert!(!ChangeType::Create.needs_justification());
        assert!(!ChangeType::Other.needs_justification());
    }
}
