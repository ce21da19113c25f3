//! Suggestion submission endpoints.

use aerodict_common::{AppError, AppResult};
use aerodict_core::{ImageUpload, SubmitSuggestionInput};
use aerodict_db::entities::suggestion::{self, ChangeType, SuggestionStatus};
use axum::{
    Json, Router,
    extract::{FromRequest, Multipart, Request, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::upload;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A suggestion as shown to its author and in the moderation queue.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub id: String,
    pub user_id: String,
    pub term_id: Option<String>,
    pub title: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
    pub change_type: ChangeType,
    pub justification: String,
    pub source_url: String,
    pub status: SuggestionStatus,
    pub admin_notes: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<suggestion::Model> for SuggestionResponse {
    fn from(s: suggestion::Model) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            term_id: s.term_id,
            title: s.title,
            decod_en: s.decod_en,
            decod_pt: s.decod_pt,
            explanation: s.explanation,
            change_type: s.change_type,
            justification: s.justification,
            source_url: s.source_url,
            status: s.status,
            admin_notes: s.admin_notes,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

fn parse_change_type(value: &str) -> AppResult<ChangeType> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_ascii_lowercase()))
        .map_err(|_| AppError::Validation(format!("Unknown change type: {value}")))
}

/// Read a multipart submission: the same fields as the JSON body plus any
/// number of `images` files.
async fn read_form(mut multipart: Multipart) -> AppResult<(SubmitSuggestionInput, Vec<ImageUpload>)> {
    let mut input = SubmitSuggestionInput::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(upload::multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "images" | "image" => {
                if let Some(image) = upload::file(field).await? {
                    images.push(image);
                }
            }
            "termSlug" => {
                let text = upload::text(field).await?;
                input.term_slug = Some(text).filter(|s| !s.trim().is_empty());
            }
            "title" => input.title = upload::text(field).await?,
            "decodEn" => input.decod_en = upload::text(field).await?,
            "decodPt" => input.decod_pt = upload::text(field).await?,
            "explanation" => input.explanation = upload::text(field).await?,
            "changeType" => {
                let text = upload::text(field).await?;
                if !text.trim().is_empty() {
                    input.change_type = parse_change_type(&text)?;
                }
            }
            "justification" => input.justification = upload::text(field).await?,
            "sourceUrl" => input.source_url = upload::text(field).await?,
            "links" => input.links = upload::text(field).await?,
            "videos" => input.videos = upload::text(field).await?,
            _ => {}
        }
    }

    Ok((input, images))
}

/// Submit a suggestion as JSON, or as a multipart form carrying images.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    req: Request,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    let (input, images) = if upload::is_multipart(req.headers()) {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_form(multipart).await?
    } else {
        let Json(input) = Json::<SubmitSuggestionInput>::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        (input, Vec::new())
    };

    let suggestion = state
        .suggestion_service
        .submit(&user.id, input, images)
        .await?;

    Ok(ApiResponse::ok(suggestion.into()))
}

/// The caller's own suggestions, newest first.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SuggestionResponse>>> {
    let suggestions = state.suggestion_service.list_mine(&user.id).await?;
    Ok(ApiResponse::ok(
        suggestions.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/mine", get(mine))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change_type() {
        assert_eq!(parse_change_type("Correction").ok(), Some(ChangeType::Correction));
        assert_eq!(parse_change_type(" media ").ok(), Some(ChangeType::Media));
        assert!(matches!(
            parse_change_type("rewrite"),
            Err(AppError::Validation(_))
        ));
    }
}
