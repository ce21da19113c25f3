//! Dashboard statistics.

use std::sync::Arc;

use aerodict_common::AppResult;
use aerodict_db::entities::suggestion::SuggestionStatus;
use aerodict_db::entities::suggestion_application_log;
use aerodict_db::repositories::{ApplicationLogRepository, SuggestionRepository, TermRepository};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Application log entries shown on the dashboard.
pub const RECENT_APPLICATIONS: u64 = 5;

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub terms: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub recent_applications: Vec<suggestion_application_log::Model>,
}

#[derive(Clone)]
pub struct StatsService {
    term_repo: TermRepository,
    suggestion_repo: SuggestionRepository,
    log_repo: ApplicationLogRepository,
}

impl StatsService {
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            term_repo: TermRepository::new(db.clone()),
            suggestion_repo: SuggestionRepository::new(db.clone()),
            log_repo: ApplicationLogRepository::new(db),
        }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            terms: self.term_repo.count().await?,
            pending: self
                .suggestion_repo
                .count_by_status(SuggestionStatus::Pending)
                .await?,
            approved: self
                .suggestion_repo
                .count_by_status(SuggestionStatus::Approved)
                .await?,
            rejected: self
                .suggestion_repo
                .count_by_status(SuggestionStatus::Rejected)
                .await?,
            recent_applications: self.log_repo.find_latest(RECENT_APPLICATIONS).await?,
        })
    }
}
