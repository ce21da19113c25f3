//! Suggestion repository.

use std::sync::Arc;

use crate::entities::{
    Suggestion, SuggestionImage, SuggestionLink, SuggestionVideo, suggestion, suggestion_image,
    suggestion_link, suggestion_video,
};
use crate::entities::suggestion::SuggestionStatus;
use aerodict_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Suggestion repository for database operations.
#[derive(Clone)]
pub struct SuggestionRepository {
    db: Arc<DatabaseConnection>,
}

impl SuggestionRepository {
    /// Create a new suggestion repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a suggestion by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<suggestion::Model>> {
        Suggestion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a suggestion by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<suggestion::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SuggestionNotFound(id.to_string()))
    }

    /// Update a suggestion.
    pub async fn update(&self, model: suggestion::ActiveModel) -> AppResult<suggestion::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Suggestions in a status, newest first.
    pub async fn find_by_status(
        &self,
        status: SuggestionStatus,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<suggestion::Model>> {
        Suggestion::find()
            .filter(suggestion::Column::Status.eq(status))
            .order_by_desc(suggestion::Column::CreatedAt)
            .order_by_desc(suggestion::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Suggestions authored by a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<suggestion::Model>> {
        Suggestion::find()
            .filter(suggestion::Column::UserId.eq(user_id))
            .order_by_desc(suggestion::Column::CreatedAt)
            .order_by_desc(suggestion::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The user's most recent suggestion, if any.
    pub async fn find_latest_by_user(&self, user_id: &str) -> AppResult<Option<suggestion::Model>> {
        Ok(self.find_by_user(user_id, 1).await?.into_iter().next())
    }

    /// Count suggestions in a status.
    pub async fn count_by_status(&self, status: SuggestionStatus) -> AppResult<u64> {
        Suggestion::find()
            .filter(suggestion::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // Draft media

    /// Draft images of a suggestion.
    pub async fn find_images(
        &self,
        suggestion_id: &str,
    ) -> AppResult<Vec<suggestion_image::Model>> {
        SuggestionImage::find()
            .filter(suggestion_image::Column::SuggestionId.eq(suggestion_id))
            .order_by_asc(suggestion_image::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Draft links of a suggestion.
    pub async fn find_links(&self, suggestion_id: &str) -> AppResult<Vec<suggestion_link::Model>> {
        SuggestionLink::find()
            .filter(suggestion_link::Column::SuggestionId.eq(suggestion_id))
            .order_by_asc(suggestion_link::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Draft videos of a suggestion.
    pub async fn find_videos(
        &self,
        suggestion_id: &str,
    ) -> AppResult<Vec<suggestion_video::Model>> {
        SuggestionVideo::find()
            .filter(suggestion_video::Column::SuggestionId.eq(suggestion_id))
            .order_by_asc(suggestion_video::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::suggestion::ChangeType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_suggestion(id: &str, status: SuggestionStatus) -> suggestion::Model {
        let now = Utc::now();
        suggestion::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            term_id: None,
            title: "METAR".to_string(),
            decod_en: "Meteorological Aerodrome Report".to_string(),
            decod_pt: String::new(),
            explanation: String::new(),
            change_type: ChangeType::Create,
            justification: String::new(),
            source_url: String::new(),
            status,
            admin_notes: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<suggestion::Model>::new()])
                .into_connection(),
        );

        let repo = SuggestionRepository::new(db);
        let result = repo.get_by_id("missing").await;
        assert!(matches!(result, Err(AppError::SuggestionNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_suggestion("s2", SuggestionStatus::Pending),
                    create_test_suggestion("s1", SuggestionStatus::Pending),
                ]])
                .into_connection(),
        );

        let repo = SuggestionRepository::new(db);
        let result = repo
            .find_by_status(SuggestionStatus::Pending, 20, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "s2");
    }

    #[tokio::test]
    async fn test_find_latest_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_suggestion("s9", SuggestionStatus::Pending)]])
                .into_connection(),
        );

        let repo = SuggestionRepository::new(db);
        let latest = repo.find_latest_by_user("user1").await.unwrap();
        assert_eq!(latest.unwrap().id, "s9");
    }
}
