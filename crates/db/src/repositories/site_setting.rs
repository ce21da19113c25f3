//! Site setting repository.

use std::sync::Arc;

use crate::entities::{SiteSetting, site_setting};
use crate::entities::site_setting::SITE_SETTING_ID;
use aerodict_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel};
use tracing::debug;

/// Repository for the site setting singleton.
#[derive(Clone)]
pub struct SiteSettingRepository {
    db: Arc<DatabaseConnection>,
}

impl SiteSettingRepository {
    /// Create a new site setting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get the settings row, creating it with defaults if missing.
    pub async fn get_or_create(&self) -> AppResult<site_setting::Model> {
        if let Some(settings) = self.find().await? {
            return Ok(settings);
        }

        let defaults = site_setting::Model::default().into_active_model();
        match defaults.insert(self.db.as_ref()).await {
            Ok(settings) => Ok(settings),
            Err(e) => {
                // Another request may have inserted the row first
                debug!(error = %e, "Site setting insert failed, re-reading");
                self.find()
                    .await?
                    .ok_or_else(|| AppError::Database(e.to_string()))
            }
        }
    }

    /// Find the settings row.
    pub async fn find(&self) -> AppResult<Option<site_setting::Model>> {
        SiteSetting::find_by_id(SITE_SETTING_ID)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update the settings row.
    pub async fn update(
        &self,
        model: site_setting::ActiveModel,
    ) -> AppResult<site_setting::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let mut existing = site_setting::Model::default();
        existing.site_name = "Custom".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let repo = SiteSettingRepository::new(db);
        let settings = repo.get_or_create().await.unwrap();
        assert_eq!(settings.site_name, "Custom");
        assert_eq!(settings.id, SITE_SETTING_ID);
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_defaults() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<site_setting::Model>::new()])
                .append_query_results([[site_setting::Model::default()]])
                .into_connection(),
        );

        let repo = SiteSettingRepository::new(db);
        let settings = repo.get_or_create().await.unwrap();
        assert_eq!(settings.items_per_page, 12);
        assert_eq!(settings.autocomplete_throttle_ms, 1000);
        assert_eq!(settings.suggestions_min_justification, 15);
    }

    #[test]
    fn test_page_size_never_zero() {
        let mut settings = site_setting::Model::default();
        settings.items_per_page = 0;
        assert_eq!(settings.page_size(), 1);
    }
}
