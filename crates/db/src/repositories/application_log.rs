//! Suggestion application log repository.

use std::sync::Arc;

use crate::entities::{SuggestionApplicationLog, suggestion_application_log};
use aerodict_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Read access to the append-only application log.
#[derive(Clone)]
pub struct ApplicationLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ApplicationLogRepository {
    /// Create a new application log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Most recent entries across all suggestions.
    pub async fn find_latest(
        &self,
        limit: u64,
    ) -> AppResult<Vec<suggestion_application_log::Model>> {
        SuggestionApplicationLog::find()
            .order_by_desc(suggestion_application_log::Column::CreatedAt)
            .order_by_desc(suggestion_application_log::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries written for one suggestion, newest first.
    pub async fn find_by_suggestion(
        &self,
        suggestion_id: &str,
    ) -> AppResult<Vec<suggestion_application_log::Model>> {
        SuggestionApplicationLog::find()
            .filter(suggestion_application_log::Column::SuggestionId.eq(suggestion_id))
            .order_by_desc(suggestion_application_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn test_find_latest() {
        let entry = suggestion_application_log::Model {
            id: "l1".to_string(),
            suggestion_id: "s1".to_string(),
            term_id: "t1".to_string(),
            approver_id: Some("admin".to_string()),
            fields_changed: json!(["decod_pt", "explanation"]),
            media_added: 1,
            links_added: 0,
            videos_added: 2,
            notes: String::new(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );

        let repo = ApplicationLogRepository::new(db);
        let logs = repo.find_latest(5).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].changed_fields(), vec!["decod_pt", "explanation"]);
    }
}
