//! Public glossary endpoints.

use aerodict_common::AppResult;
use aerodict_core::{AutocompleteItem, TermDetail, search::AUTOCOMPLETE_MIN_CHARS};
use aerodict_db::{entities::term, repositories::TermPage};
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{extractors::ClientAddr, middleware::AppState, response::ApiResponse};

/// A term as it appears in listings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<term::Model> for TermResponse {
    fn from(term: term::Model) -> Self {
        Self {
            id: term.id,
            title: term.title,
            slug: term.slug,
            decod_en: term.decod_en,
            decod_pt: term.decod_pt,
            explanation: term.explanation,
            created_at: term.created_at,
            updated_at: term.updated_at,
        }
    }
}

/// One page of terms.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermListResponse {
    pub items: Vec<TermResponse>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl From<TermPage> for TermListResponse {
    fn from(page: TermPage) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            pages: page.pages,
        }
    }
}

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub letter: Option<String>,
    pub page: Option<u64>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<TermListResponse>> {
    let page = state
        .search_service
        .list(
            query.q.as_deref(),
            query.letter.as_deref(),
            query.page.unwrap_or(1),
        )
        .await?;

    Ok(ApiResponse::ok(page.into()))
}

async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<TermDetail>> {
    Ok(ApiResponse::ok(state.term_service.detail(&slug).await?))
}

/// Autocomplete query.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
}

/// Ranked suggestions for the search box.
///
/// A client repeating the same query inside the throttle window gets an
/// empty list instead of an error.
async fn autocomplete(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<ApiResponse<Vec<AutocompleteItem>>> {
    let settings = state.site_settings_service.get().await?;
    let q = query.q.trim();
    if !settings.enable_autocomplete || q.chars().count() < AUTOCOMPLETE_MIN_CHARS {
        return Ok(ApiResponse::ok(vec![]));
    }

    if !state
        .rate_limiter
        .autocomplete_allowed(&client, q, settings.autocomplete_throttle_ms)
        .await
    {
        debug!(client = %client, query = %q, "Autocomplete throttled");
        return Ok(ApiResponse::ok(vec![]));
    }

    let items = state.search_service.autocomplete(&settings, q).await?;
    Ok(ApiResponse::ok(items))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/terms", get(list))
        .route("/terms/{slug}", get(detail))
        .route("/autocomplete", get(autocomplete))
}
