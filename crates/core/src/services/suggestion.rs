//! Suggestion service: submission, moderation queue and rejection.
//!
//! Approval lives in [`super::merge`].

use std::sync::Arc;

use aerodict_common::{
    AppError, AppResult, IdGenerator, normalize_url, split_entries, strip_tags, validate_video_url,
};
use aerodict_db::entities::{
    site_setting, suggestion, suggestion_application_log, suggestion_image, suggestion_link,
    suggestion_video, term,
};
use aerodict_db::entities::suggestion::{ChangeType, SuggestionStatus};
use aerodict_db::repositories::{
    ApplicationLogRepository, SiteSettingRepository, SuggestionRepository, TermRepository,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::media::{ImageUpload, MediaService, SUGGESTION_IMAGE_WIDTHS};

/// Suggestions per page in the moderation queue.
pub const QUEUE_PAGE_SIZE: u64 = 20;

/// How many of their own suggestions a user sees.
pub const MINE_LIMIT: u64 = 50;

/// A suggestion as submitted. Links and videos are free text, one per line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitSuggestionInput {
    /// Existing term to correct or complement.
    pub term_slug: Option<String>,
    pub title: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
    pub change_type: ChangeType,
    pub justification: String,
    pub source_url: String,
    pub links: String,
    pub videos: String,
}

/// What the target term already carries.
#[derive(Debug, Clone, Copy)]
pub struct TargetTerm<'a> {
    pub term: &'a term::Model,
    /// Whether the term has images, links or videos.
    pub has_media: bool,
}

/// A submission that passed every rule, with markup stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSubmission {
    pub title: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
    pub change_type: ChangeType,
    pub justification: String,
    pub source_url: String,
    pub links: Vec<String>,
    /// `(url, video id)` pairs.
    pub videos: Vec<(String, String)>,
}

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Sanitize a submission and check it against the site's rules.
pub fn clean_submission(
    input: SubmitSuggestionInput,
    target: Option<TargetTerm<'_>>,
    images: &[ImageUpload],
    settings: &site_setting::Model,
) -> AppResult<CleanSubmission> {
    if !settings.suggestions_enabled {
        return Err(AppError::Forbidden("Suggestions are disabled".to_string()));
    }

    let title = strip_tags(&input.title);
    let decod_en = strip_tags(&input.decod_en);
    let decod_pt = strip_tags(&input.decod_pt);
    let explanation = strip_tags(&input.explanation);
    let justification = strip_tags(&input.justification);
    let links_text = strip_tags(&input.links);
    let videos_text = strip_tags(&input.videos);

    if target.is_none() && title.is_empty() {
        return Err(invalid("A title is required when no term is selected"));
    }

    let has_definition = !decod_en.is_empty() || !decod_pt.is_empty() || !explanation.is_empty();
    let has_media = !images.is_empty() || !links_text.is_empty() || !videos_text.is_empty();
    if title.is_empty() && !has_definition && !has_media {
        return Err(invalid(
            "Include at least one field: definition, translation, link, video or image",
        ));
    }

    let mut change_type = input.change_type;
    let mut source_url = input.source_url.trim().to_string();
    if let Some(target) = target {
        let current = target.term;
        let repeats = |proposed: &str, existing: &str| !proposed.is_empty() && proposed == existing.trim();
        if repeats(&decod_en, &current.decod_en)
            || repeats(&decod_pt, &current.decod_pt)
            || repeats(&explanation, &current.explanation)
        {
            return Err(invalid(
                "The suggestion repeats information the term already has",
            ));
        }

        let has_core = !current.decod_en.trim().is_empty()
            || !current.decod_pt.trim().is_empty()
            || !current.explanation.trim().is_empty();
        let min = usize::try_from(settings.suggestions_min_justification).unwrap_or(0);
        if change_type.needs_justification()
            && (has_core || target.has_media)
            && justification.chars().count() < min
        {
            return Err(AppError::Validation(format!(
                "Explain the change in at least {min} characters"
            )));
        }

        if change_type == ChangeType::Correction
            && settings.suggestions_require_source
            && source_url.is_empty()
        {
            return Err(invalid("Corrections need a source URL"));
        }
    } else {
        if !has_definition && !has_media {
            return Err(invalid(
                "A new term needs at least one definition or a media item",
            ));
        }
        change_type = ChangeType::Create;
    }

    if !source_url.is_empty() {
        source_url = normalize_url(&source_url).unwrap_or_default();
        url::Url::parse(&source_url)
            .map_err(|e| AppError::Validation(format!("Invalid source URL: {e}")))?;
    }

    let max_bytes = u64::try_from(settings.suggestion_max_image_mb).unwrap_or(0) * 1024 * 1024;
    for image in images {
        if !image.content_type.starts_with("image/") {
            return Err(invalid("Only image files can be uploaded"));
        }
        if image.data.len() as u64 > max_bytes {
            return Err(AppError::Validation(format!(
                "Each image must be at most {} MB",
                settings.suggestion_max_image_mb
            )));
        }
    }

    let mut links: Vec<String> = Vec::new();
    for entry in split_entries(&links_text) {
        let Some(link) = normalize_url(&entry) else {
            continue;
        };
        url::Url::parse(&link)
            .map_err(|e| AppError::Validation(format!("Invalid link {link}: {e}")))?;
        if !links.iter().any(|l| l.eq_ignore_ascii_case(&link)) {
            links.push(link);
        }
    }

    let mut videos: Vec<(String, String)> = Vec::new();
    for entry in split_entries(&videos_text) {
        let video_id = validate_video_url(&entry)?;
        if !videos.iter().any(|(_, id)| *id == video_id) {
            videos.push((entry, video_id));
        }
    }

    Ok(CleanSubmission {
        title,
        decod_en,
        decod_pt,
        explanation,
        change_type,
        justification,
        source_url,
        links,
        videos,
    })
}

/// A draft image with its URL and preview variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionImageView {
    pub image: suggestion_image::Model,
    pub url: String,
    pub srcset: String,
}

/// A suggestion with its target, draft media and application history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDetail {
    pub suggestion: suggestion::Model,
    pub term: Option<term::Model>,
    pub images: Vec<SuggestionImageView>,
    pub links: Vec<suggestion_link::Model>,
    pub videos: Vec<suggestion_video::Model>,
    pub applications: Vec<suggestion_application_log::Model>,
}

/// Storage directory for a suggestion's draft images.
#[must_use]
pub fn suggestion_media_dir(term_slug: Option<&str>) -> String {
    format!("suggestions/{}", term_slug.unwrap_or("new"))
}

/// Suggestion service for business logic.
#[derive(Clone)]
pub struct SuggestionService {
    db: Arc<DatabaseConnection>,
    suggestion_repo: SuggestionRepository,
    term_repo: TermRepository,
    settings_repo: SiteSettingRepository,
    log_repo: ApplicationLogRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

impl SuggestionService {
    /// Create a new suggestion service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, media: MediaService) -> Self {
        Self {
            suggestion_repo: SuggestionRepository::new(db.clone()),
            term_repo: TermRepository::new(db.clone()),
            settings_repo: SiteSettingRepository::new(db.clone()),
            log_repo: ApplicationLogRepository::new(db.clone()),
            db,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store a suggestion with its draft media.
    pub async fn submit(
        &self,
        user_id: &str,
        input: SubmitSuggestionInput,
        images: Vec<ImageUpload>,
    ) -> AppResult<suggestion::Model> {
        let settings = self.settings_repo.get_or_create().await?;

        let target = match input.term_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Some(self.term_repo.get_by_slug(slug).await?),
            None => None,
        };
        let target_has_media = match &target {
            Some(term) => self.term_has_media(&term.id).await?,
            None => false,
        };

        let clean = clean_submission(
            input,
            target.as_ref().map(|term| TargetTerm {
                term,
                has_media: target_has_media,
            }),
            &images,
            &settings,
        )?;

        self.check_cooldown(user_id, &settings).await?;

        let dir = suggestion_media_dir(target.as_ref().map(|t| t.slug.as_str()));
        let mut image_keys = Vec::with_capacity(images.len());
        for upload in &images {
            match self
                .media
                .save_image(&dir, upload, &SUGGESTION_IMAGE_WIDTHS)
                .await
            {
                Ok(stored) => image_keys.push(stored.key),
                Err(e) => {
                    self.discard_images(&image_keys).await;
                    return Err(e);
                }
            }
        }

        let term_id = target.map(|t| t.id);
        match self.persist(user_id, term_id, clean, &image_keys).await {
            Ok(suggestion) => {
                info!(
                    suggestion_id = %suggestion.id,
                    user_id,
                    images = image_keys.len(),
                    "Suggestion submitted"
                );
                Ok(suggestion)
            }
            Err(e) => {
                warn!(user_id, error = %e, "Suggestion not stored, removing its images");
                self.discard_images(&image_keys).await;
                Err(e)
            }
        }
    }

    /// Insert the suggestion and its draft media in one transaction.
    async fn persist(
        &self,
        user_id: &str,
        term_id: Option<String>,
        clean: CleanSubmission,
        image_keys: &[String],
    ) -> AppResult<suggestion::Model> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(db_err)?;

        let suggestion = suggestion::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            term_id: Set(term_id),
            title: Set(clean.title),
            decod_en: Set(clean.decod_en),
            decod_pt: Set(clean.decod_pt),
            explanation: Set(clean.explanation),
            change_type: Set(clean.change_type),
            justification: Set(clean.justification),
            source_url: Set(clean.source_url),
            status: Set(SuggestionStatus::Pending),
            admin_notes: Set(String::new()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        for key in image_keys {
            suggestion_image::ActiveModel {
                id: Set(self.id_gen.generate()),
                suggestion_id: Set(suggestion.id.clone()),
                file_key: Set(key.clone()),
                alt_text: Set(String::new()),
                title: Set(String::new()),
                caption: Set(String::new()),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        for url in clean.links {
            suggestion_link::ActiveModel {
                id: Set(self.id_gen.generate()),
                suggestion_id: Set(suggestion.id.clone()),
                url: Set(url),
                label: Set(String::new()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        for (url, video_id) in clean.videos {
            suggestion_video::ActiveModel {
                id: Set(self.id_gen.generate()),
                suggestion_id: Set(suggestion.id.clone()),
                url: Set(url),
                video_id: Set(video_id),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(suggestion)
    }

    /// Best-effort removal of images stored for a submission that failed.
    async fn discard_images(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.media.delete_image(key).await {
                warn!(key = %key, error = %e, "Failed to remove image of failed submission");
            }
        }
    }

    /// The author's own suggestions, newest first.
    pub async fn list_mine(&self, user_id: &str) -> AppResult<Vec<suggestion::Model>> {
        self.suggestion_repo.find_by_user(user_id, MINE_LIMIT).await
    }

    /// Moderation queue page (1-based) for a status.
    pub async fn list_by_status(
        &self,
        status: SuggestionStatus,
        page: u64,
    ) -> AppResult<Vec<suggestion::Model>> {
        let offset = page.saturating_sub(1) * QUEUE_PAGE_SIZE;
        self.suggestion_repo
            .find_by_status(status, QUEUE_PAGE_SIZE, offset)
            .await
    }

    /// Full view of one suggestion.
    pub async fn detail(&self, id: &str) -> AppResult<SuggestionDetail> {
        let suggestion = self.suggestion_repo.get_by_id(id).await?;
        let term = match &suggestion.term_id {
            Some(term_id) => self.term_repo.find_by_id(term_id).await?,
            None => None,
        };

        let mut images = Vec::new();
        for image in self.suggestion_repo.find_images(id).await? {
            images.push(SuggestionImageView {
                url: self.media.url(&image.file_key),
                srcset: self
                    .media
                    .srcset(&image.file_key, &SUGGESTION_IMAGE_WIDTHS)
                    .await,
                image,
            });
        }

        Ok(SuggestionDetail {
            links: self.suggestion_repo.find_links(id).await?,
            videos: self.suggestion_repo.find_videos(id).await?,
            applications: self.log_repo.find_by_suggestion(id).await?,
            suggestion,
            term,
            images,
        })
    }

    /// Reject a pending suggestion. Rejecting twice is a no-op; an approved
    /// suggestion cannot be rejected.
    pub async fn reject(&self, id: &str, notes: Option<&str>) -> AppResult<suggestion::Model> {
        let suggestion = self.suggestion_repo.get_by_id(id).await?;
        match suggestion.status {
            SuggestionStatus::Rejected => return Ok(suggestion),
            SuggestionStatus::Approved => {
                return Err(AppError::Conflict(
                    "Suggestion has already been applied".to_string(),
                ));
            }
            SuggestionStatus::Pending => {}
        }

        let mut active: suggestion::ActiveModel = suggestion.into();
        active.status = Set(SuggestionStatus::Rejected);
        if let Some(notes) = notes {
            active.admin_notes = Set(strip_tags(notes));
        }
        active.updated_at = Set(Utc::now().into());

        let suggestion = self.suggestion_repo.update(active).await?;
        info!(suggestion_id = %suggestion.id, "Suggestion rejected");
        Ok(suggestion)
    }

    async fn term_has_media(&self, term_id: &str) -> AppResult<bool> {
        Ok(!self.term_repo.find_images(term_id).await?.is_empty()
            || !self.term_repo.find_links(term_id).await?.is_empty()
            || !self.term_repo.find_videos(term_id).await?.is_empty())
    }

    async fn check_cooldown(&self, user_id: &str, settings: &site_setting::Model) -> AppResult<()> {
        let seconds = i64::from(settings.suggestion_rate_limit_seconds);
        if seconds <= 0 {
            return Ok(());
        }

        if let Some(latest) = self.suggestion_repo.find_latest_by_user(user_id).await? {
            let elapsed = Utc::now().signed_duration_since(latest.created_at);
            if elapsed < Duration::seconds(seconds) {
                warn!(user_id, "Suggestion rejected by cooldown");
                return Err(AppError::RateLimited);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aerodict_common::MemoryStorage;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn settings() -> site_setting::Model {
        site_setting::Model::default()
    }

    fn existing_term() -> term::Model {
        term::Model {
            id: "term1".to_string(),
            title: "IFR".to_string(),
            slug: "ifr".to_string(),
            decod_en: "Instrument Flight Rules".to_string(),
            decod_pt: "Regras de voo por instrumentos".to_string(),
            explanation: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn target(term: &term::Model) -> Option<TargetTerm<'_>> {
        Some(TargetTerm {
            term,
            has_media: false,
        })
    }

    fn png_upload(size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0; size],
        }
    }

    #[test]
    fn test_new_term_without_title_is_rejected() {
        let input = SubmitSuggestionInput {
            decod_en: "Something".to_string(),
            ..Default::default()
        };
        let err = clean_submission(input, None, &[], &settings()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_new_term_needs_definition_or_media() {
        let input = SubmitSuggestionInput {
            title: "AFIZ".to_string(),
            ..Default::default()
        };
        assert!(clean_submission(input, None, &[], &settings()).is_err());

        let input = SubmitSuggestionInput {
            title: "AFIZ".to_string(),
            links: "example.com/afiz".to_string(),
            ..Default::default()
        };
        let clean = clean_submission(input, None, &[], &settings()).unwrap();
        assert_eq!(clean.change_type, ChangeType::Create);
        assert_eq!(clean.links, vec!["http://example.com/afiz"]);
    }

    #[test]
    fn test_redundant_suggestion_is_rejected() {
        let term = existing_term();
        let input = SubmitSuggestionInput {
            decod_en: "<i>Instrument Flight Rules</i>".to_string(),
            justification: "Confirming the decoding is right".to_string(),
            ..Default::default()
        };
        let err = clean_submission(input, target(&term), &[], &settings()).unwrap_err();
        assert!(err.to_string().contains("repeats"));
    }

    #[test]
    fn test_justification_required_for_filled_term() {
        let term = existing_term();
        let input = SubmitSuggestionInput {
            explanation: "Rules for flight under instrument conditions.".to_string(),
            change_type: ChangeType::Complement,
            justification: "short".to_string(),
            ..Default::default()
        };
        assert!(clean_submission(input.clone(), target(&term), &[], &settings()).is_err());

        let input = SubmitSuggestionInput {
            justification: "The term has no explanation yet".to_string(),
            ..input
        };
        assert!(clean_submission(input, target(&term), &[], &settings()).is_ok());
    }

    #[test]
    fn test_other_change_needs_no_justification() {
        let term = existing_term();
        let input = SubmitSuggestionInput {
            explanation: "Rules for flight under instrument conditions.".to_string(),
            change_type: ChangeType::Other,
            ..Default::default()
        };
        assert!(clean_submission(input, target(&term), &[], &settings()).is_ok());
    }

    #[test]
    fn test_correction_requires_source() {
        let term = existing_term();
        let input = SubmitSuggestionInput {
            decod_pt: "Regras de voo por instrumento".to_string(),
            change_type: ChangeType::Correction,
            justification: "Singular is the usual form".to_string(),
            ..Default::default()
        };
        let err = clean_submission(input.clone(), target(&term), &[], &settings()).unwrap_err();
        assert!(err.to_string().contains("source"));

        let relaxed = site_setting::Model {
            suggestions_require_source: false,
            ..settings()
        };
        assert!(clean_submission(input, target(&term), &[], &relaxed).is_ok());
    }

    #[test]
    fn test_invalid_video_rejects_submission() {
        let input = SubmitSuggestionInput {
            title: "ILS".to_string(),
            videos: "https://youtu.be/dQw4w9WgXcQ\nhttps://vimeo.com/1".to_string(),
            ..Default::default()
        };
        let err = clean_submission(input, None, &[], &settings()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_videos_deduplicate_by_id() {
        let input = SubmitSuggestionInput {
            title: "ILS".to_string(),
            videos: "https://youtu.be/dQw4w9WgXcQ https://www.youtube.com/watch?v=dQw4w9WgXcQ"
                .to_string(),
            ..Default::default()
        };
        let clean = clean_submission(input, None, &[], &settings()).unwrap();
        assert_eq!(clean.videos.len(), 1);
        assert_eq!(clean.videos[0].1, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_image_rules() {
        let input = SubmitSuggestionInput {
            title: "ILS".to_string(),
            ..Default::default()
        };
        let small = settings();
        assert!(clean_submission(input.clone(), None, &[png_upload(10)], &small).is_ok());

        let too_big = png_upload(6 * 1024 * 1024 + 1);
        assert!(clean_submission(input.clone(), None, &[too_big], &small).is_err());

        let not_image = ImageUpload {
            content_type: "application/pdf".to_string(),
            ..png_upload(10)
        };
        assert!(clean_submission(input, None, &[not_image], &small).is_err());
    }

    #[test]
    fn test_disabled_suggestions() {
        let disabled = site_setting::Model {
            suggestions_enabled: false,
            ..settings()
        };
        let input = SubmitSuggestionInput {
            title: "ILS".to_string(),
            decod_en: "Instrument Landing System".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            clean_submission(input, None, &[], &disabled),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_suggestion_media_dir() {
        assert_eq!(suggestion_media_dir(Some("ifr")), "suggestions/ifr");
        assert_eq!(suggestion_media_dir(None), "suggestions/new");
    }

    fn pending(id: &str, status: SuggestionStatus) -> suggestion::Model {
        let now = Utc::now();
        suggestion::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            term_id: None,
            title: "ILS".to_string(),
            decod_en: "Instrument Landing System".to_string(),
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

    fn service(db: MockDatabase) -> SuggestionService {
        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        SuggestionService::new(Arc::new(db.into_connection()), media)
    }

    #[tokio::test]
    async fn test_reject_approved_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending("s1", SuggestionStatus::Approved)]]);
        let result = service(db).reject("s1", None).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_pending() {
        let mut rejected = pending("s1", SuggestionStatus::Rejected);
        rejected.admin_notes = "Duplicate".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending("s1", SuggestionStatus::Pending)]])
            .append_query_results([vec![rejected]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let result = service(db).reject("s1", Some("Duplicate")).await.unwrap();
        assert_eq!(result.status, SuggestionStatus::Rejected);
        assert_eq!(result.admin_notes, "Duplicate");
    }

    #[tokio::test]
    async fn test_submit_respects_cooldown() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![site_setting::Model::default()]])
            .append_query_results([vec![pending("s0", SuggestionStatus::Pending)]]);

        let input = SubmitSuggestionInput {
            title: "ILS".to_string(),
            decod_en: "Instrument Landing System".to_string(),
            ..Default::default()
        };
        let result = service(db).submit("user1", input, vec![]).await;
        assert!(matches!(result, Err(AppError::RateLimited)));
    }

    fn ils_input() -> SubmitSuggestionInput {
        SubmitSuggestionInput {
            title: "ILS".to_string(),
            decod_en: "Instrument Landing System".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failed_submission_removes_stored_images() {
        // The draft image insert finds no result and fails.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![site_setting::Model::default()]])
            .append_query_results([Vec::<suggestion::Model>::new()])
            .append_query_results([vec![pending("s1", SuggestionStatus::Pending)]]);

        let storage = Arc::new(MemoryStorage::new("/media"));
        let service = SuggestionService::new(
            Arc::new(db.into_connection()),
            MediaService::new(storage.clone()),
        );

        let result = service.submit("user1", ils_input(), vec![png_upload(16)]).await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_submission_stores_draft_images() {
        let draft_image = suggestion_image::Model {
            id: "img1".to_string(),
            suggestion_id: "s1".to_string(),
            file_key: "suggestions/new/a.png".to_string(),
            alt_text: String::new(),
            title: String::new(),
            caption: String::new(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![site_setting::Model::default()]])
            .append_query_results([Vec::<suggestion::Model>::new()])
            .append_query_results([vec![pending("s1", SuggestionStatus::Pending)]])
            .append_query_results([vec![draft_image]]);

        let storage = Arc::new(MemoryStorage::new("/media"));
        let service = SuggestionService::new(
            Arc::new(db.into_connection()),
            MediaService::new(storage.clone()),
        );

        let suggestion = service
            .submit("user1", ils_input(), vec![png_upload(16)])
            .await
            .unwrap();
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
        assert_eq!(storage.keys().await, vec!["suggestions/new/a.png".to_string()]);
    }
}
