//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use aerodict_common::StorageService;
use aerodict_core::{
    AccountService, CsvService, HistoryService, MediaService, MergeService, SearchService,
    SiteSettingsService, StatsService, SuggestionService, TermService,
};
use aerodict_db::repositories::{SiteSettingRepository, UserRepository};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;

use crate::rate_limit::RateLimiterState;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub term_service: TermService,
    pub history_service: HistoryService,
    pub search_service: SearchService,
    pub suggestion_service: SuggestionService,
    pub merge_service: MergeService,
    pub csv_service: CsvService,
    pub stats_service: StatsService,
    pub site_settings_service: SiteSettingsService,
    pub media_service: MediaService,
    pub rate_limiter: RateLimiterState,
    /// Public base URL, used for absolute links in the sitemap.
    pub site_url: String,
}

impl AppState {
    /// Wire every service over one connection pool and media store.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, storage: StorageService, site_url: impl Into<String>) -> Self {
        let media_service = MediaService::new(storage);

        Self {
            account_service: AccountService::new(UserRepository::new(Arc::clone(&db))),
            term_service: TermService::new(Arc::clone(&db), media_service.clone()),
            history_service: HistoryService::new(Arc::clone(&db)),
            search_service: SearchService::new(Arc::clone(&db)),
            suggestion_service: SuggestionService::new(Arc::clone(&db), media_service.clone()),
            merge_service: MergeService::new(Arc::clone(&db), media_service.clone()),
            csv_service: CsvService::new(Arc::clone(&db)),
            stats_service: StatsService::new(Arc::clone(&db)),
            site_settings_service: SiteSettingsService::new(
                SiteSettingRepository::new(db),
                media_service.clone(),
            ),
            media_service,
            rate_limiter: RateLimiterState::new(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <token>` header attaches the user to the
/// request; anything else passes through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.account_service.authenticate_by_token(token.trim()).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
