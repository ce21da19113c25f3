//! Term history repository.

use std::sync::Arc;

use crate::entities::{TermHistory, term_history};
use aerodict_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Read access to term snapshots. Rows are written by the term and merge
/// services inside their own transactions.
#[derive(Clone)]
pub struct TermHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl TermHistoryRepository {
    /// Create a new term history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Snapshots of a term, newest first.
    pub async fn find_by_term(&self, term_id: &str) -> AppResult<Vec<term_history::Model>> {
        TermHistory::find()
            .filter(term_history::Column::TermId.eq(term_id))
            .order_by_desc(term_history::Column::CreatedAt)
            .order_by_desc(term_history::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest snapshot of a term.
    pub async fn find_latest(&self, term_id: &str) -> AppResult<Option<term_history::Model>> {
        TermHistory::find()
            .filter(term_history::Column::TermId.eq(term_id))
            .order_by_desc(term_history::Column::CreatedAt)
            .order_by_desc(term_history::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A snapshot belonging to a term.
    pub async fn find_for_term(
        &self,
        term_id: &str,
        history_id: &str,
    ) -> AppResult<Option<term_history::Model>> {
        TermHistory::find_by_id(history_id)
            .filter(term_history::Column::TermId.eq(term_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a snapshot.
    pub async fn create(&self, model: term_history::ActiveModel) -> AppResult<term_history::Model> {
        model
            .insert(self.db.as_ref())
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

    #[tokio::test]
    async fn test_find_latest() {
        let snapshot = term_history::Model {
            id: "h2".to_string(),
            term_id: "t1".to_string(),
            previous_title: "VOR".to_string(),
            previous_decod_en: "VHF Omnidirectional Range".to_string(),
            previous_decod_pt: String::new(),
            previous_explanation: String::new(),
            changed_by: Some("admin".to_string()),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[snapshot]])
                .into_connection(),
        );

        let repo = TermHistoryRepository::new(db);
        let latest = repo.find_latest("t1").await.unwrap().unwrap();
        assert_eq!(latest.id, "h2");
        assert_eq!(latest.previous_title, "VOR");
    }
}
