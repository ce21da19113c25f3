//! Administration endpoints: moderation queue, term editing, history,
//! media, CSV and site settings. Every route requires an administrator.

use std::collections::HashMap;

use aerodict_common::{AppError, AppResult};
use aerodict_core::{
    ApplyOutcome, ApplyReport, BrandingImage, CreateTermInput, DashboardStats, HistoryDiff,
    ImageMeta, ImportReport, SuggestionDetail, TermImageView, UpdateSiteSettingsInput,
    UpdateTermInput,
};
use aerodict_db::{
    FilterOption, TermFilter,
    entities::{
        site_setting,
        suggestion::SuggestionStatus,
        term_history, term_link, term_synonym, term_video,
    },
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::suggestions::SuggestionResponse;
use super::terms::{TermListResponse, TermResponse};
use super::upload;
use crate::{extractors::AdminUser, middleware::AppState, response, response::ApiResponse};

// ==================== Moderation queue ====================

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
}

async fn list_suggestions(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<ApiResponse<Vec<SuggestionResponse>>> {
    let status = match query.status.as_deref() {
        None | Some("") => SuggestionStatus::Pending,
        Some(value) => SuggestionStatus::parse(value)
            .ok_or_else(|| AppError::Validation(format!("Unknown status: {value}")))?,
    };

    let suggestions = state
        .suggestion_service
        .list_by_status(status, query.page.unwrap_or(1))
        .await?;

    Ok(ApiResponse::ok(
        suggestions.into_iter().map(Into::into).collect(),
    ))
}

async fn show_suggestion(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SuggestionDetail>> {
    Ok(ApiResponse::ok(state.suggestion_service.detail(&id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ModerationRequest {
    pub notes: Option<String>,
}

/// `applied` is false when the term already carried everything proposed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ApplyReport>,
}

async fn approve_suggestion(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ModerationRequest>>,
) -> AppResult<ApiResponse<ApproveResponse>> {
    let notes = body.and_then(|Json(b)| b.notes);
    let outcome = state
        .merge_service
        .apply(&id, &admin.id, notes.as_deref())
        .await?;

    let response = match outcome {
        ApplyOutcome::Applied(report) => ApproveResponse {
            applied: true,
            report: Some(report),
        },
        ApplyOutcome::NoEffectiveChange => {
            info!(suggestion_id = %id, "Suggestion had nothing left to apply");
            ApproveResponse {
                applied: false,
                report: None,
            }
        }
    };

    Ok(ApiResponse::ok(response))
}

async fn reject_suggestion(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ModerationRequest>>,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    let notes = body.and_then(|Json(b)| b.notes);
    let suggestion = state
        .suggestion_service
        .reject(&id, notes.as_deref())
        .await?;
    Ok(ApiResponse::ok(suggestion.into()))
}

// ==================== Site settings ====================

async fn get_settings(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<site_setting::Model>> {
    Ok(ApiResponse::ok(state.site_settings_service.get().await?))
}

async fn update_settings(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSiteSettingsInput>,
) -> AppResult<ApiResponse<site_setting::Model>> {
    let settings = state.site_settings_service.update(req).await?;
    info!(admin = %admin.username, "Site settings updated");
    Ok(ApiResponse::ok(settings))
}

async fn upload_branding(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(slot): Path<String>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<site_setting::Model>> {
    let slot = BrandingImage::parse(&slot)
        .ok_or_else(|| AppError::NotFound(format!("Unknown branding image: {slot}")))?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(upload::multipart_error)? {
        if matches!(field.name(), Some("image" | "file")) {
            image = upload::file(field).await?;
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    let settings = state.site_settings_service.upload_branding(slot, &image).await?;
    info!(admin = %admin.username, slot = ?slot, "Branding image uploaded");
    Ok(ApiResponse::ok(settings))
}

// ==================== Terms ====================

/// One admin filter and the values it accepts.
#[derive(Serialize)]
pub struct FilterResponse {
    pub parameter: &'static str,
    pub options: Vec<FilterOption>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTermListResponse {
    #[serde(flatten)]
    pub page: TermListResponse,
    pub filters: Vec<FilterResponse>,
}

/// Every filter kind the listing understands.
const FILTER_KINDS: [TermFilter; 2] = [TermFilter::StartingLetter('A'), TermFilter::HasImages(true)];

/// Listing with `q`, `page` and any filter parameter (`letter`, `hasImages`).
/// Unknown parameters and unaccepted values are ignored.
async fn list_terms(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<ApiResponse<AdminTermListResponse>> {
    let page = params
        .get("page")
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(1);
    let filters: Vec<TermFilter> = params
        .iter()
        .filter_map(|(key, value)| TermFilter::parse(key, value))
        .collect();

    let result = state
        .search_service
        .admin_list(params.get("q").map(String::as_str), filters, page)
        .await?;

    Ok(ApiResponse::ok(AdminTermListResponse {
        page: result.into(),
        filters: FILTER_KINDS
            .iter()
            .map(|f| FilterResponse {
                parameter: f.parameter(),
                options: f.options(),
            })
            .collect(),
    }))
}

async fn create_term(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTermInput>,
) -> AppResult<ApiResponse<TermResponse>> {
    let term = state.term_service.create(req).await?;
    info!(admin = %admin.username, slug = %term.slug, "Term created");
    Ok(ApiResponse::ok(term.into()))
}

async fn update_term(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateTermInput>,
) -> AppResult<ApiResponse<TermResponse>> {
    let term = state
        .term_service
        .update(&slug, req, &admin.username)
        .await?;
    Ok(ApiResponse::ok(term.into()))
}

async fn delete_term(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.term_service.delete(&slug).await?;
    info!(admin = %admin.username, slug = %slug, "Term deleted");
    Ok(response::ok())
}

// ==================== History ====================

async fn list_history(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Vec<term_history::Model>>> {
    Ok(ApiResponse::ok(state.history_service.list(&slug).await?))
}

async fn diff_history(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, history_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<HistoryDiff>> {
    Ok(ApiResponse::ok(
        state.history_service.diff(&slug, &history_id).await?,
    ))
}

async fn revert_last(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<TermResponse>> {
    let term = state.history_service.revert_last(&slug).await?;
    info!(admin = %admin.username, slug = %slug, "Term reverted to its last snapshot");
    Ok(ApiResponse::ok(term.into()))
}

async fn revert_to(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, history_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<TermResponse>> {
    let term = state.history_service.revert_to(&slug, &history_id).await?;
    info!(admin = %admin.username, slug = %slug, history_id = %history_id, "Term reverted");
    Ok(ApiResponse::ok(term.into()))
}

// ==================== Synonyms, images, links, videos ====================

#[derive(Debug, Deserialize, Validate)]
pub struct SynonymRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn add_synonym(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SynonymRequest>,
) -> AppResult<ApiResponse<term_synonym::Model>> {
    req.validate()?;
    Ok(ApiResponse::ok(
        state.term_service.add_synonym(&slug, &req.name).await?,
    ))
}

async fn remove_synonym(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.term_service.remove_synonym(&slug, &id).await?;
    Ok(response::ok())
}

/// Upload an image (`image` file field) with optional `altText`, `title`,
/// `caption` and `displayOrder` fields.
async fn add_image(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<TermImageView>> {
    let mut image = None;
    let mut meta = ImageMeta::default();

    while let Some(field) = multipart.next_field().await.map_err(upload::multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "file" => image = upload::file(field).await?,
            "altText" => meta.alt_text = upload::text(field).await?,
            "title" => meta.title = upload::text(field).await?,
            "caption" => meta.caption = upload::text(field).await?,
            "displayOrder" => {
                let text = upload::text(field).await?;
                meta.display_order = text.trim().parse().map_err(|_| {
                    AppError::Validation(format!("displayOrder must be a number: {text}"))
                })?;
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    Ok(ApiResponse::ok(
        state.term_service.add_image(&slug, &image, meta).await?,
    ))
}

async fn remove_image(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.term_service.remove_image(&slug, &id).await?;
    Ok(response::ok())
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub url: String,
    #[serde(default)]
    pub label: String,
}

async fn add_link(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<LinkRequest>,
) -> AppResult<ApiResponse<term_link::Model>> {
    Ok(ApiResponse::ok(
        state.term_service.add_link(&slug, &req.url, &req.label).await?,
    ))
}

async fn remove_link(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.term_service.remove_link(&slug, &id).await?;
    Ok(response::ok())
}

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub url: String,
}

async fn add_video(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<VideoRequest>,
) -> AppResult<ApiResponse<term_video::Model>> {
    Ok(ApiResponse::ok(
        state.term_service.add_video(&slug, &req.url).await?,
    ))
}

async fn remove_video(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.term_service.remove_video(&slug, &id).await?;
    Ok(response::ok())
}

// ==================== CSV ====================

#[derive(Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub report: ImportReport,
    pub summary: String,
}

/// Import terms from a CSV upload (`file` field) or a raw CSV body.
async fn import_csv(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    req: Request,
) -> AppResult<ApiResponse<ImportResponse>> {
    let data = if upload::is_multipart(req.headers()) {
        let mut multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut data = None;
        while let Some(field) = multipart.next_field().await.map_err(upload::multipart_error)? {
            if field.name() == Some("file") {
                data = Some(field.bytes().await.map_err(upload::multipart_error)?.to_vec());
            }
        }
        data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?
    } else {
        Bytes::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
            .to_vec()
    };

    if data.is_empty() {
        return Err(AppError::BadRequest("Empty CSV".to_string()));
    }

    let report = state
        .csv_service
        .import(&data, Some(&admin.username))
        .await?;
    let summary = report.summary();
    info!(admin = %admin.username, summary = %summary, "CSV import finished");

    Ok(ApiResponse::ok(ImportResponse { report, summary }))
}

async fn export_csv(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let body = state.csv_service.export().await?;
    Ok(response::attachment(
        "text/csv; charset=utf-8",
        "termos.csv",
        body,
    ))
}

// ==================== Dashboard ====================

async fn stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardStats>> {
    Ok(ApiResponse::ok(state.stats_service.dashboard().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Moderation
        .route("/suggestions", get(list_suggestions))
        .route("/suggestions/{id}", get(show_suggestion))
        .route("/suggestions/{id}/approve", post(approve_suggestion))
        .route("/suggestions/{id}/reject", post(reject_suggestion))
        // Settings
        .route("/settings", get(get_settings).post(update_settings))
        .route("/settings/branding/{slot}", post(upload_branding))
        // Terms
        .route("/terms", get(list_terms).post(create_term))
        .route("/terms/{slug}", post(update_term).delete(delete_term))
        .route("/terms/{slug}/history", get(list_history))
        .route("/terms/{slug}/history/{id}/diff", get(diff_history))
        .route("/terms/{slug}/history/{id}/revert", post(revert_to))
        .route("/terms/{slug}/revert-last", post(revert_last))
        .route("/terms/{slug}/synonyms", post(add_synonym))
        .route("/terms/{slug}/synonyms/{id}", delete(remove_synonym))
        .route("/terms/{slug}/images", post(add_image))
        .route("/terms/{slug}/images/{id}", delete(remove_image))
        .route("/terms/{slug}/links", post(add_link))
        .route("/terms/{slug}/links/{id}", delete(remove_link))
        .route("/terms/{slug}/videos", post(add_video))
        .route("/terms/{slug}/videos/{id}", delete(remove_video))
        // CSV
        .route("/csv/import", post(import_csv))
        .route("/csv/export", get(export_csv))
        // Dashboard
        .route("/stats", get(stats))
}
