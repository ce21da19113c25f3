//! Suggestion-merge engine.
//!
//! Applying a suggestion copies its non-redundant text and media onto the
//! target term inside one transaction, then marks the suggestion approved
//! and appends an application log row. A suggestion with nothing left to
//! apply leaves the database untouched.

use std::sync::Arc;

use aerodict_common::storage::file_name;
use aerodict_common::{
    AppError, AppResult, IdGenerator, extract_video_id, normalize_url, slugify, strip_tags,
};
use aerodict_db::entities::suggestion::SuggestionStatus;
use aerodict_db::entities::{
    Suggestion, SuggestionImage, SuggestionLink, SuggestionVideo, Term, TermImage, TermLink,
    TermVideo, suggestion, suggestion_application_log, suggestion_image, suggestion_link,
    suggestion_video, term, term_image, term_link, term_video,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::history::snapshot;
use super::media::{MediaService, TERM_IMAGE_WIDTHS};
use super::term::term_media_dir;

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

/// A suggestion with its draft media.
#[derive(Debug, Clone)]
pub struct SuggestionDraft {
    pub suggestion: suggestion::Model,
    pub images: Vec<suggestion_image::Model>,
    pub links: Vec<suggestion_link::Model>,
    pub videos: Vec<suggestion_video::Model>,
}

/// A term with the media it already has.
#[derive(Debug, Clone)]
pub struct TermState {
    pub term: term::Model,
    pub images: Vec<term_image::Model>,
    pub links: Vec<term_link::Model>,
    pub videos: Vec<term_video::Model>,
}

/// Changes a suggestion would make to a term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub decod_en: Option<String>,
    pub decod_pt: Option<String>,
    pub explanation: Option<String>,
    /// Draft images whose file name the term does not have yet.
    pub images: Vec<suggestion_image::Model>,
    /// Normalized link URLs new to the term.
    pub links: Vec<String>,
    /// `(url, video id)` pairs new to the term.
    pub videos: Vec<(String, String)>,
}

impl MergePlan {
    /// Names of the text fields the plan overwrites.
    #[must_use]
    pub fn fields_changed(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.decod_en.is_some() {
            fields.push("decod_en");
        }
        if self.decod_pt.is_some() {
            fields.push("decod_pt");
        }
        if self.explanation.is_some() {
            fields.push("explanation");
        }
        fields
    }

    #[must_use]
    pub fn has_text_changes(&self) -> bool {
        self.decod_en.is_some() || self.decod_pt.is_some() || self.explanation.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_text_changes()
            && self.images.is_empty()
            && self.links.is_empty()
            && self.videos.is_empty()
    }
}

fn changed_text(proposed: &str, current: &str) -> Option<String> {
    let sanitized = strip_tags(proposed);
    (!sanitized.is_empty() && sanitized != current).then_some(sanitized)
}

/// Work out what applying `draft` to `target` would change.
#[must_use]
pub fn plan_merge(draft: &SuggestionDraft, target: &TermState) -> MergePlan {
    let s = &draft.suggestion;
    let t = &target.term;

    let mut known_files: Vec<String> = target
        .images
        .iter()
        .map(|i| file_name(&i.file_key).to_string())
        .collect();
    let mut images = Vec::new();
    for image in &draft.images {
        let name = file_name(&image.file_key).to_string();
        if !known_files.contains(&name) {
            known_files.push(name);
            images.push(image.clone());
        }
    }

    let mut known_links: Vec<String> = target.links.iter().map(|l| l.url.to_lowercase()).collect();
    let mut links = Vec::new();
    for link in &draft.links {
        let Some(url) = normalize_url(&link.url) else {
            continue;
        };
        let key = url.to_lowercase();
        if !known_links.contains(&key) {
            known_links.push(key);
            links.push(url);
        }
    }

    let mut known_videos: Vec<String> = target.videos.iter().map(|v| v.video_id.clone()).collect();
    let mut videos = Vec::new();
    for video in &draft.videos {
        let Some(id) = extract_video_id(&video.url) else {
            continue;
        };
        if !known_videos.contains(&id) {
            known_videos.push(id.clone());
            videos.push((video.url.trim().to_string(), id));
        }
    }

    MergePlan {
        decod_en: changed_text(&s.decod_en, &t.decod_en),
        decod_pt: changed_text(&s.decod_pt, &t.decod_pt),
        explanation: changed_text(&s.explanation, &t.explanation),
        images,
        links,
        videos,
    }
}

/// What an application did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub term: term::Model,
    pub term_created: bool,
    pub fields_changed: Vec<String>,
    pub media_added: i32,
    pub links_added: i32,
    pub videos_added: i32,
    pub log_id: String,
}

/// Result of applying a suggestion.
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    Applied(ApplyReport),
    /// Every proposed value is already on the term; nothing was written.
    NoEffectiveChange,
}

/// Applies suggestions to terms.
#[derive(Clone)]
pub struct MergeService {
    db: Arc<DatabaseConnection>,
    media: MediaService,
    id_gen: IdGenerator,
}

impl MergeService {
    /// Create a new merge service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, media: MediaService) -> Self {
        Self {
            db,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply a suggestion on behalf of `approver_id`.
    ///
    /// Approved suggestions may be applied again; only what is still missing
    /// from the term is added. Rejected suggestions are a conflict.
    pub async fn apply(
        &self,
        suggestion_id: &str,
        approver_id: &str,
        notes: Option<&str>,
    ) -> AppResult<ApplyOutcome> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let draft = load_draft(&txn, suggestion_id).await?;
        if draft.suggestion.status == SuggestionStatus::Rejected {
            return Err(AppError::Conflict(
                "Suggestion has been rejected".to_string(),
            ));
        }

        let (target, term_created) = self.resolve_target(&txn, &draft.suggestion).await?;
        let mut plan = plan_merge(&draft, &target);
        plan.images = self.available_images(plan.images).await?;

        if plan.is_empty() && !term_created {
            info!(suggestion_id, term_id = %target.term.id, "Suggestion has no effective change");
            return Ok(ApplyOutcome::NoEffectiveChange);
        }

        let mut fields_changed: Vec<String> = Vec::new();
        if term_created {
            fields_changed.push("title".to_string());
        }
        fields_changed.extend(plan.fields_changed().into_iter().map(str::to_string));

        let mut term = target.term;
        if plan.has_text_changes() {
            if !term_created {
                snapshot(self.id_gen.generate(), &term, Some(approver_id))
                    .insert(&txn)
                    .await
                    .map_err(db_err)?;
            }

            let mut active: term::ActiveModel = term.into();
            if let Some(v) = plan.decod_en.clone() {
                active.decod_en = Set(v);
            }
            if let Some(v) = plan.decod_pt.clone() {
                active.decod_pt = Set(v);
            }
            if let Some(v) = plan.explanation.clone() {
                active.explanation = Set(v);
            }
            active.updated_at = Set(Some(Utc::now().into()));
            term = active.update(&txn).await.map_err(db_err)?;
        }

        let now = Utc::now();
        let next_order = target
            .images
            .iter()
            .map(|i| i.display_order)
            .max()
            .map_or(0, |m| m + 1);
        let mut migrated = Vec::new();
        for (offset, image) in plan.images.iter().enumerate() {
            let key = self
                .media
                .copy_image(&image.file_key, &term_media_dir(&term.slug), &TERM_IMAGE_WIDTHS)
                .await?;
            term_image::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id.clone()),
                file_key: Set(key.clone()),
                alt_text: Set(image.alt_text.clone()),
                title: Set(image.title.clone()),
                caption: Set(image.caption.clone()),
                display_order: Set(next_order + offset as i32),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;

            // The draft now refers to the term's copy
            let mut moved: suggestion_image::ActiveModel = image.clone().into();
            moved.file_key = Set(key);
            moved.update(&txn).await.map_err(db_err)?;
            migrated.push(image.file_key.clone());
        }

        for url in &plan.links {
            term_link::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id.clone()),
                url: Set(url.clone()),
                label: Set(String::new()),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        for (url, video_id) in &plan.videos {
            term_video::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id.clone()),
                url: Set(url.clone()),
                video_id: Set(video_id.clone()),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        let notes = notes.map(strip_tags).unwrap_or_default();
        let mut active: suggestion::ActiveModel = draft.suggestion.into();
        active.status = Set(SuggestionStatus::Approved);
        active.term_id = Set(Some(term.id.clone()));
        if !notes.is_empty() {
            active.admin_notes = Set(notes.clone());
        }
        active.updated_at = Set(now.into());
        active.update(&txn).await.map_err(db_err)?;

        let log = suggestion_application_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            suggestion_id: Set(suggestion_id.to_string()),
            term_id: Set(term.id.clone()),
            approver_id: Set(Some(approver_id.to_string())),
            fields_changed: Set(serde_json::json!(fields_changed)),
            media_added: Set(plan.images.len() as i32),
            links_added: Set(plan.links.len() as i32),
            videos_added: Set(plan.videos.len() as i32),
            notes: Set(notes),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        for key in migrated {
            if let Err(e) = self.media.delete_image(&key).await {
                warn!(key = %key, error = %e, "Failed to remove migrated suggestion image");
            }
        }

        info!(
            suggestion_id,
            term_id = %term.id,
            term_created,
            fields = ?fields_changed,
            "Suggestion applied"
        );

        Ok(ApplyOutcome::Applied(ApplyReport {
            term,
            term_created,
            fields_changed,
            media_added: plan.images.len() as i32,
            links_added: plan.links.len() as i32,
            videos_added: plan.videos.len() as i32,
            log_id: log.id,
        }))
    }

    /// Draft images whose file is still in storage. A draft already
    /// migrated to a term whose image was later removed has nothing to copy.
    async fn available_images(
        &self,
        images: Vec<suggestion_image::Model>,
    ) -> AppResult<Vec<suggestion_image::Model>> {
        let mut available = Vec::with_capacity(images.len());
        for image in images {
            if self.media.exists(&image.file_key).await? {
                available.push(image);
            } else {
                warn!(key = %image.file_key, "Draft image file is missing; skipping");
            }
        }
        Ok(available)
    }

    /// The suggestion's target, or the term found-or-created by the slug of
    /// its title. The flag is true when a term was created.
    async fn resolve_target(
        &self,
        txn: &DatabaseTransaction,
        suggestion: &suggestion::Model,
    ) -> AppResult<(TermState, bool)> {
        let existing = match &suggestion.term_id {
            Some(term_id) => Term::find_by_id(term_id.as_str())
                .one(txn)
                .await
                .map_err(db_err)?,
            None => None,
        };

        let (term, created) = match existing {
            Some(term) => (term, false),
            None => {
                let title = strip_tags(&suggestion.title);
                if title.is_empty() {
                    return Err(AppError::Validation(
                        "A suggestion without a target term needs a title".to_string(),
                    ));
                }
                let slug = slugify(&title);
                if slug.is_empty() {
                    return Err(AppError::Validation(
                        "Title must contain letters or digits".to_string(),
                    ));
                }

                let found = Term::find()
                    .filter(term::Column::Slug.eq(slug.as_str()))
                    .one(txn)
                    .await
                    .map_err(db_err)?;
                match found {
                    Some(term) => (term, false),
                    None => {
                        let term = term::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            title: Set(title),
                            slug: Set(slug),
                            decod_en: Set(String::new()),
                            decod_pt: Set(String::new()),
                            explanation: Set(String::new()),
                            created_at: Set(Utc::now().into()),
                            updated_at: Set(None),
                        }
                        .insert(txn)
                        .await
                        .map_err(db_err)?;
                        (term, true)
                    }
                }
            }
        };

        let images = TermImage::find()
            .filter(term_image::Column::TermId.eq(term.id.as_str()))
            .order_by_asc(term_image::Column::DisplayOrder)
            .all(txn)
            .await
            .map_err(db_err)?;
        let links = TermLink::find()
            .filter(term_link::Column::TermId.eq(term.id.as_str()))
            .all(txn)
            .await
            .map_err(db_err)?;
        let videos = TermVideo::find()
            .filter(term_video::Column::TermId.eq(term.id.as_str()))
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok((
            TermState {
                term,
                images,
                links,
                videos,
            },
            created,
        ))
    }
}

async fn load_draft(txn: &DatabaseTransaction, suggestion_id: &str) -> AppResult<SuggestionDraft> {
    let suggestion = Suggestion::find_by_id(suggestion_id)
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::SuggestionNotFound(suggestion_id.to_string()))?;

    let images = SuggestionImage::find()
        .filter(suggestion_image::Column::SuggestionId.eq(suggestion_id))
        .order_by_asc(suggestion_image::Column::Id)
        .all(txn)
        .await
        .map_err(db_err)?;
    let links = SuggestionLink::find()
        .filter(suggestion_link::Column::SuggestionId.eq(suggestion_id))
        .all(txn)
        .await
        .map_err(db_err)?;
    let videos = SuggestionVideo::find()
        .filter(suggestion_video::Column::SuggestionId.eq(suggestion_id))
        .all(txn)
        .await
        .map_err(db_err)?;

    Ok(SuggestionDraft {
        suggestion,
        images,
        links,
        videos,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aerodict_common::{MemoryStorage, StorageBackend};
    use aerodict_db::entities::suggestion::ChangeType;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn term_model() -> term::Model {
        term::Model {
            id: "term1".to_string(),
            title: "VOR".to_string(),
            slug: "vor".to_string(),
            decod_en: "VHF Omnidirectional Range".to_string(),
            decod_pt: String::new(),
            explanation: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn suggestion_model() -> suggestion::Model {
        let now = Utc::now();
        suggestion::Model {
            id: "sug1".to_string(),
            user_id: "user1".to_string(),
            term_id: Some("term1".to_string()),
            title: String::new(),
            decod_en: "VHF Omnidirectional Range".to_string(),
            decod_pt: "<p>Radiofarol omnidirecional VHF</p>".to_string(),
            explanation: String::new(),
            change_type: ChangeType::Complement,
            justification: "Portuguese decoding was missing".to_string(),
            source_url: String::new(),
            status: SuggestionStatus::Pending,
            admin_notes: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn state(term: term::Model) -> TermState {
        TermState {
            term,
            images: vec![],
            links: vec![],
            videos: vec![],
        }
    }

    fn draft(suggestion: suggestion::Model) -> SuggestionDraft {
        SuggestionDraft {
            suggestion,
            images: vec![],
            links: vec![],
            videos: vec![],
        }
    }

    fn draft_image(key: &str) -> suggestion_image::Model {
        suggestion_image::Model {
            id: key.to_string(),
            suggestion_id: "sug1".to_string(),
            file_key: key.to_string(),
            alt_text: String::new(),
            title: String::new(),
            caption: String::new(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_plan_applies_only_differing_text() {
        let plan = plan_merge(&draft(suggestion_model()), &state(term_model()));
        assert_eq!(plan.decod_en, None);
        assert_eq!(plan.decod_pt.as_deref(), Some("Radiofarol omnidirecional VHF"));
        assert_eq!(plan.fields_changed(), vec!["decod_pt"]);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_second_application_is_empty() {
        let mut term = term_model();
        term.decod_pt = "Radiofarol omnidirecional VHF".to_string();
        let plan = plan_merge(&draft(suggestion_model()), &state(term));
        assert!(plan.is_empty());
        assert!(plan.fields_changed().is_empty());
    }

    #[test]
    fn test_plan_skips_known_images_by_file_name() {
        let mut target = state(term_model());
        target.images.push(term_image::Model {
            id: "img1".to_string(),
            term_id: "term1".to_string(),
            file_key: "terms/vor/station.jpg".to_string(),
            alt_text: String::new(),
            title: String::new(),
            caption: String::new(),
            display_order: 0,
            created_at: Utc::now().into(),
        });

        let mut d = draft(suggestion_model());
        d.images = vec![
            draft_image("suggestions/vor/station.jpg"),
            draft_image("suggestions/vor/antenna.jpg"),
            draft_image("suggestions/new/antenna.jpg"),
        ];

        let plan = plan_merge(&d, &target);
        let keys: Vec<&str> = plan.images.iter().map(|i| i.file_key.as_str()).collect();
        assert_eq!(keys, vec!["suggestions/vor/antenna.jpg"]);
    }

    #[test]
    fn test_plan_links_case_insensitive_with_scheme() {
        let mut target = state(term_model());
        target.links.push(term_link::Model {
            id: "l1".to_string(),
            term_id: "term1".to_string(),
            url: "http://example.com/VOR".to_string(),
            label: String::new(),
            created_at: Utc::now().into(),
        });

        let mut d = draft(suggestion_model());
        d.links = ["example.com/vor", "https://skybrary.aero/vor", "HTTPS://skybrary.aero/VOR"]
            .iter()
            .map(|url| suggestion_link::Model {
                id: (*url).to_string(),
                suggestion_id: "sug1".to_string(),
                url: (*url).to_string(),
                label: String::new(),
            })
            .collect();

        let plan = plan_merge(&d, &target);
        assert_eq!(plan.links, vec!["https://skybrary.aero/vor"]);
    }

    #[test]
    fn test_plan_videos_skip_invalid_and_known() {
        let mut target = state(term_model());
        target.videos.push(term_video::Model {
            id: "v1".to_string(),
            term_id: "term1".to_string(),
            url: "https://youtu.be/aaaaaaaaaaa".to_string(),
            video_id: "aaaaaaaaaaa".to_string(),
            created_at: Utc::now().into(),
        });

        let mut d = draft(suggestion_model());
        d.videos = [
            "https://www.youtube.com/watch?v=aaaaaaaaaaa",
            "https://vimeo.com/1",
            "youtu.be/bbbbbbbbbbb",
        ]
        .iter()
        .map(|url| suggestion_video::Model {
            id: (*url).to_string(),
            suggestion_id: "sug1".to_string(),
            url: (*url).to_string(),
            video_id: String::new(),
        })
        .collect();

        let plan = plan_merge(&d, &target);
        assert_eq!(
            plan.videos,
            vec![("youtu.be/bbbbbbbbbbb".to_string(), "bbbbbbbbbbb".to_string())]
        );
    }

    #[tokio::test]
    async fn test_apply_without_change_writes_nothing() {
        let mut term = term_model();
        term.decod_pt = "Radiofarol omnidirecional VHF".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![suggestion_model()]])
            .append_query_results([Vec::<suggestion_image::Model>::new()])
            .append_query_results([Vec::<suggestion_link::Model>::new()])
            .append_query_results([Vec::<suggestion_video::Model>::new()])
            .append_query_results([vec![term]])
            .append_query_results([Vec::<term_image::Model>::new()])
            .append_query_results([Vec::<term_link::Model>::new()])
            .append_query_results([Vec::<term_video::Model>::new()])
            .into_connection();

        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        let outcome = MergeService::new(Arc::new(db), media)
            .apply("sug1", "admin1", None)
            .await
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::NoEffectiveChange));
    }

    #[tokio::test]
    async fn test_apply_missing_suggestion() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<suggestion::Model>::new()])
            .into_connection();

        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        let result = MergeService::new(Arc::new(db), media)
            .apply("nope", "admin1", None)
            .await;
        assert!(matches!(result, Err(AppError::SuggestionNotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_rejected_suggestion_is_conflict() {
        let mut rejected = suggestion_model();
        rejected.status = SuggestionStatus::Rejected;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![rejected]])
            .append_query_results([Vec::<suggestion_image::Model>::new()])
            .append_query_results([Vec::<suggestion_link::Model>::new()])
            .append_query_results([Vec::<suggestion_video::Model>::new()])
            .into_connection();

        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        let result = MergeService::new(Arc::new(db), media)
            .apply("sug1", "admin1", None)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_skips_draft_image_without_file() {
        let mut term = term_model();
        term.decod_pt = "Radiofarol omnidirecional VHF".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![suggestion_model()]])
            .append_query_results([vec![draft_image("terms/vor/antenna.jpg")]])
            .append_query_results([Vec::<suggestion_link::Model>::new()])
            .append_query_results([Vec::<suggestion_video::Model>::new()])
            .append_query_results([vec![term]])
            .append_query_results([Vec::<term_image::Model>::new()])
            .append_query_results([Vec::<term_link::Model>::new()])
            .append_query_results([Vec::<term_video::Model>::new()])
            .into_connection();

        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        let outcome = MergeService::new(Arc::new(db), media)
            .apply("sug1", "admin1", None)
            .await
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::NoEffectiveChange));
    }

    fn log_model(term_id: &str) -> suggestion_application_log::Model {
        suggestion_application_log::Model {
            id: "log1".to_string(),
            suggestion_id: "sug1".to_string(),
            term_id: term_id.to_string(),
            approver_id: Some("admin1".to_string()),
            fields_changed: serde_json::json!([]),
            media_added: 0,
            links_added: 0,
            videos_added: 0,
            notes: String::new(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_apply_snapshots_and_migrates_media() {
        let storage = Arc::new(MemoryStorage::new("/media"));
        storage
            .upload("suggestions/vor/antenna.jpg", b"not really a jpeg", "image/jpeg")
            .await
            .unwrap();

        let mut updated = term_model();
        updated.decod_pt = "Radiofarol omnidirecional VHF".to_string();
        let mut approved = suggestion_model();
        approved.status = SuggestionStatus::Approved;
        let mut moved = draft_image("suggestions/vor/antenna.jpg");
        moved.file_key = "terms/vor/antenna.jpg".to_string();
        let now = Utc::now();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![suggestion_model()]])
                .append_query_results([vec![draft_image("suggestions/vor/antenna.jpg")]])
                .append_query_results([vec![suggestion_link::Model {
                    id: "sl1".to_string(),
                    suggestion_id: "sug1".to_string(),
                    url: "skybrary.aero/vor".to_string(),
                    label: String::new(),
                }]])
                .append_query_results([vec![suggestion_video::Model {
                    id: "sv1".to_string(),
                    suggestion_id: "sug1".to_string(),
                    url: "youtu.be/bbbbbbbbbbb".to_string(),
                    video_id: "bbbbbbbbbbb".to_string(),
                }]])
                .append_query_results([vec![term_model()]])
                .append_query_results([Vec::<term_image::Model>::new()])
                .append_query_results([Vec::<term_link::Model>::new()])
                .append_query_results([Vec::<term_video::Model>::new()])
                .append_query_results([vec![aerodict_db::entities::term_history::Model {
                    id: "hist1".to_string(),
                    term_id: "term1".to_string(),
                    previous_title: "VOR".to_string(),
                    previous_decod_en: "VHF Omnidirectional Range".to_string(),
                    previous_decod_pt: String::new(),
                    previous_explanation: String::new(),
                    changed_by: Some("admin1".to_string()),
                    created_at: now.into(),
                }]])
                .append_query_results([vec![updated]])
                .append_query_results([vec![term_image::Model {
                    id: "ti1".to_string(),
                    term_id: "term1".to_string(),
                    file_key: "terms/vor/antenna.jpg".to_string(),
                    alt_text: String::new(),
                    title: String::new(),
                    caption: String::new(),
                    display_order: 0,
                    created_at: now.into(),
                }]])
                .append_query_results([vec![moved]])
                .append_query_results([vec![term_link::Model {
                    id: "tl1".to_string(),
                    term_id: "term1".to_string(),
                    url: "http://skybrary.aero/vor".to_string(),
                    label: String::new(),
                    created_at: now.into(),
                }]])
                .append_query_results([vec![term_video::Model {
                    id: "tv1".to_string(),
                    term_id: "term1".to_string(),
                    url: "youtu.be/bbbbbbbbbbb".to_string(),
                    video_id: "bbbbbbbbbbb".to_string(),
                    created_at: now.into(),
                }]])
                .append_query_results([vec![approved]])
                .append_query_results([vec![log_model("term1")]])
                .into_connection(),
        );

        let service = MergeService::new(db.clone(), MediaService::new(storage.clone()));
        let outcome = service.apply("sug1", "admin1", Some("Thanks")).await.unwrap();
        drop(service);

        let ApplyOutcome::Applied(report) = outcome else {
            panic!("expected the suggestion to apply");
        };
        assert!(!report.term_created);
        assert_eq!(report.fields_changed, vec!["decod_pt".to_string()]);
        assert_eq!(report.term.decod_pt, "Radiofarol omnidirecional VHF");
        assert_eq!(
            (report.media_added, report.links_added, report.videos_added),
            (1, 1, 1)
        );
        assert_eq!(report.log_id, "log1");

        assert_eq!(storage.keys().await, vec!["terms/vor/antenna.jpg".to_string()]);

        let statements = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(statements.contains("term_history"));
        assert!(statements.contains(r#"UPDATE \"suggestion_image\""#));
    }

    #[tokio::test]
    async fn test_apply_creates_term_from_title() {
        let mut new_term = suggestion_model();
        new_term.term_id = None;
        new_term.title = "ILS".to_string();
        new_term.decod_en = "Instrument Landing System".to_string();
        new_term.decod_pt = String::new();
        new_term.change_type = ChangeType::Create;

        let created = term::Model {
            id: "term2".to_string(),
            title: "ILS".to_string(),
            slug: "ils".to_string(),
            decod_en: String::new(),
            decod_pt: String::new(),
            explanation: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let filled = term::Model {
            decod_en: "Instrument Landing System".to_string(),
            ..created.clone()
        };
        let mut approved = new_term.clone();
        approved.status = SuggestionStatus::Approved;
        approved.term_id = Some("term2".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![new_term]])
                .append_query_results([Vec::<suggestion_image::Model>::new()])
                .append_query_results([Vec::<suggestion_link::Model>::new()])
                .append_query_results([Vec::<suggestion_video::Model>::new()])
                .append_query_results([Vec::<term::Model>::new()])
                .append_query_results([vec![created]])
                .append_query_results([Vec::<term_image::Model>::new()])
                .append_query_results([Vec::<term_link::Model>::new()])
                .append_query_results([Vec::<term_video::Model>::new()])
                .append_query_results([vec![filled]])
                .append_query_results([vec![approved]])
                .append_query_results([vec![log_model("term2")]])
                .into_connection(),
        );

        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        let service = MergeService::new(db.clone(), media);
        let outcome = service.apply("sug1", "admin1", None).await.unwrap();
        drop(service);

        let ApplyOutcome::Applied(report) = outcome else {
            panic!("expected the suggestion to apply");
        };
        assert!(report.term_created);
        assert_eq!(report.term.slug, "ils");
        assert_eq!(
            report.fields_changed,
            vec!["title".to_string(), "decod_en".to_string()]
        );
        assert_eq!(report.media_added, 0);

        let statements = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!statements.contains("term_history"));
    }
}
