//! Term service: admin editing and public detail.

use std::sync::Arc;

use aerodict_common::{
    AppError, AppResult, IdGenerator, normalize_url, slugify, strip_tags, validate_video_url,
};
use aerodict_db::entities::{term, term_image, term_link, term_synonym, term_video};
use aerodict_db::repositories::TermRepository;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::history::{TermText, snapshot};
use super::media::{ImageUpload, MediaService, TERM_IMAGE_WIDTHS};

/// Input for creating a term.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTermInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub decod_en: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub decod_pt: String,

    #[serde(default)]
    pub explanation: String,
}

/// Input for editing a term's text. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTermInput {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 255))]
    pub decod_en: Option<String>,

    #[validate(length(max = 255))]
    pub decod_pt: Option<String>,

    pub explanation: Option<String>,
}

/// Metadata sent along with an uploaded term image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub display_order: i32,
}

/// A term image with its resolved URL and responsive variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermImageView {
    pub image: term_image::Model,
    pub url: String,
    pub srcset: String,
}

/// Everything shown on a term page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDetail {
    pub term: term::Model,
    pub synonyms: Vec<term_synonym::Model>,
    pub images: Vec<TermImageView>,
    pub links: Vec<term_link::Model>,
    pub videos: Vec<term_video::Model>,
}

/// Storage directory of a term's images.
#[must_use]
pub fn term_media_dir(slug: &str) -> String {
    format!("terms/{slug}")
}

/// Term service for business logic.
#[derive(Clone)]
pub struct TermService {
    db: Arc<DatabaseConnection>,
    term_repo: TermRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

impl TermService {
    /// Create a new term service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, media: MediaService) -> Self {
        Self {
            term_repo: TermRepository::new(db.clone()),
            db,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a term by slug.
    pub async fn get(&self, slug: &str) -> AppResult<term::Model> {
        self.term_repo.get_by_slug(slug).await
    }

    /// Every term, ordered by title.
    pub async fn all(&self) -> AppResult<Vec<term::Model>> {
        self.term_repo.find_all().await
    }

    /// Term with synonyms, images (with srcset), links and videos.
    pub async fn detail(&self, slug: &str) -> AppResult<TermDetail> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let synonyms = self.term_repo.find_synonyms(&term.id).await?;
        let links = self.term_repo.find_links(&term.id).await?;
        let videos = self.term_repo.find_videos(&term.id).await?;

        let mut images = Vec::new();
        for image in self.term_repo.find_images(&term.id).await? {
            images.push(TermImageView {
                url: self.media.url(&image.file_key),
                srcset: self.media.srcset(&image.file_key, &TERM_IMAGE_WIDTHS).await,
                image,
            });
        }

        Ok(TermDetail {
            term,
            synonyms,
            images,
            links,
            videos,
        })
    }

    /// Create a term. The slug is derived from the title and must be free.
    pub async fn create(&self, input: CreateTermInput) -> AppResult<term::Model> {
        input.validate()?;

        let title = strip_tags(&input.title);
        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Title must contain letters or digits".to_string(),
            ));
        }
        if self.term_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!("Term {slug} already exists")));
        }

        let model = term::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title),
            slug: Set(slug),
            decod_en: Set(strip_tags(&input.decod_en)),
            decod_pt: Set(strip_tags(&input.decod_pt)),
            explanation: Set(strip_tags(&input.explanation)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let term = self.term_repo.create(model).await?;
        info!(term_id = %term.id, slug = %term.slug, "Term created");
        Ok(term)
    }

    /// Edit a term's text. A history snapshot of the previous text is
    /// written in the same transaction. The slug never changes.
    pub async fn update(
        &self,
        slug: &str,
        input: UpdateTermInput,
        changed_by: &str,
    ) -> AppResult<term::Model> {
        input.validate()?;

        let term = self.term_repo.get_by_slug(slug).await?;
        let mut text = TermText::from_term(&term);
        if let Some(title) = input.title {
            let title = strip_tags(&title);
            if title.is_empty() {
                return Err(AppError::Validation("Title must not be empty".to_string()));
            }
            text.title = title;
        }
        if let Some(decod_en) = input.decod_en {
            text.decod_en = strip_tags(&decod_en);
        }
        if let Some(decod_pt) = input.decod_pt {
            text.decod_pt = strip_tags(&decod_pt);
        }
        if let Some(explanation) = input.explanation {
            text.explanation = strip_tags(&explanation);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        snapshot(self.id_gen.generate(), &term, Some(changed_by))
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: term::ActiveModel = term.into();
        text.apply_to(&mut active);
        let term = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(term_id = %term.id, changed_by, "Term updated");
        Ok(term)
    }

    /// Delete a term. Rows cascade; stored image files are removed best-effort.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let images = self.term_repo.find_images(&term.id).await?;
        let term_id = term.id.clone();
        self.term_repo.delete(term).await?;

        for image in images {
            if let Err(e) = self.media.delete_image(&image.file_key).await {
                warn!(key = %image.file_key, error = %e, "Failed to remove image of deleted term");
            }
        }

        info!(term_id = %term_id, slug, "Term deleted");
        Ok(())
    }

    /// Add a synonym, returning the existing one if the name is already there.
    pub async fn add_synonym(&self, slug: &str, name: &str) -> AppResult<term_synonym::Model> {
        let name = strip_tags(name);
        if name.is_empty() || name.chars().count() > 100 {
            return Err(AppError::Validation(
                "Synonym must be 1 to 100 characters".to_string(),
            ));
        }

        let term = self.term_repo.get_by_slug(slug).await?;
        if let Some(existing) = self.term_repo.find_synonym(&term.id, &name).await? {
            return Ok(existing);
        }

        self.term_repo
            .create_synonym(term_synonym::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id),
                name: Set(name),
            })
            .await
    }

    /// Remove a synonym.
    pub async fn remove_synonym(&self, slug: &str, synonym_id: &str) -> AppResult<()> {
        let term = self.term_repo.get_by_slug(slug).await?;
        if !self.term_repo.delete_synonym(&term.id, synonym_id).await? {
            return Err(AppError::NotFound(format!("Synonym {synonym_id}")));
        }
        Ok(())
    }

    /// Store an uploaded image under the term's media path and generate variants.
    pub async fn add_image(
        &self,
        slug: &str,
        upload: &ImageUpload,
        meta: ImageMeta,
    ) -> AppResult<TermImageView> {
        if !upload.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "{} is not an image",
                upload.file_name
            )));
        }

        let term = self.term_repo.get_by_slug(slug).await?;
        let stored = self
            .media
            .save_image(&term_media_dir(&term.slug), upload, &TERM_IMAGE_WIDTHS)
            .await?;

        let image = self
            .term_repo
            .create_image(term_image::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id),
                file_key: Set(stored.key.clone()),
                alt_text: Set(strip_tags(&meta.alt_text)),
                title: Set(strip_tags(&meta.title)),
                caption: Set(strip_tags(&meta.caption)),
                display_order: Set(meta.display_order),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        Ok(TermImageView {
            srcset: self.media.srcset(&image.file_key, &TERM_IMAGE_WIDTHS).await,
            url: stored.url,
            image,
        })
    }

    /// Remove an image record and its files.
    pub async fn remove_image(&self, slug: &str, image_id: &str) -> AppResult<()> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let image = self
            .term_repo
            .find_image(&term.id, image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {image_id}")))?;

        let key = image.file_key.clone();
        self.term_repo.delete_image(image).await?;
        if let Err(e) = self.media.delete_image(&key).await {
            warn!(key = %key, error = %e, "Failed to remove image file");
        }
        Ok(())
    }

    /// Add a link. A missing scheme becomes `http://`; an equal URL
    /// (case-insensitive) already on the term is returned instead.
    pub async fn add_link(&self, slug: &str, url: &str, label: &str) -> AppResult<term_link::Model> {
        let url = normalize_url(&strip_tags(url))
            .ok_or_else(|| AppError::Validation("Link URL is required".to_string()))?;
        url::Url::parse(&url)
            .map_err(|e| AppError::Validation(format!("Invalid link {url}: {e}")))?;

        let term = self.term_repo.get_by_slug(slug).await?;
        let existing = self.term_repo.find_links(&term.id).await?;
        if let Some(link) = existing
            .into_iter()
            .find(|l| l.url.eq_ignore_ascii_case(&url))
        {
            return Ok(link);
        }

        self.term_repo
            .create_link(term_link::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id),
                url: Set(url),
                label: Set(strip_tags(label)),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Remove a link.
    pub async fn remove_link(&self, slug: &str, link_id: &str) -> AppResult<()> {
        let term = self.term_repo.get_by_slug(slug).await?;
        if !self.term_repo.delete_link(&term.id, link_id).await? {
            return Err(AppError::NotFound(format!("Link {link_id}")));
        }
        Ok(())
    }

    /// Add a YouTube video. A video whose id is already on the term is returned instead.
    pub async fn add_video(&self, slug: &str, url: &str) -> AppResult<term_video::Model> {
        let url = strip_tags(url);
        let video_id = validate_video_url(&url)?;

        let term = self.term_repo.get_by_slug(slug).await?;
        let existing = self.term_repo.find_videos(&term.id).await?;
        if let Some(video) = existing.into_iter().find(|v| v.video_id == video_id) {
            return Ok(video);
        }

        self.term_repo
            .create_video(term_video::ActiveModel {
                id: Set(self.id_gen.generate()),
                term_id: Set(term.id),
                url: Set(url),
                video_id: Set(video_id),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Remove a video.
    pub async fn remove_video(&self, slug: &str, video_id: &str) -> AppResult<()> {
        let term = self.term_repo.get_by_slug(slug).await?;
        if !self.term_repo.delete_video(&term.id, video_id).await? {
            return Err(AppError::NotFound(format!("Video {video_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aerodict_common::MemoryStorage;
    use aerodict_db::entities::term_history;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_term() -> term::Model {
        term::Model {
            id: "term1".to_string(),
            title: "NOTAM".to_string(),
            slug: "notam".to_string(),
            decod_en: "Notice to Airmen".to_string(),
            decod_pt: "Aviso aos aeronavegantes".to_string(),
            explanation: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> TermService {
        let media = MediaService::new(Arc::new(MemoryStorage::new("/media")));
        TermService::new(Arc::new(db.into_connection()), media)
    }

    #[tokio::test]
    async fn test_create_rejects_existing_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_term()]]);

        let result = service(db)
            .create(CreateTermInput {
                title: "Notam".to_string(),
                decod_en: String::new(),
                decod_pt: String::new(),
                explanation: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<term::Model>::new()])
            .append_query_results([vec![sample_term()]]);

        let term = service(db)
            .create(CreateTermInput {
                title: "<b>NOTAM</b>".to_string(),
                decod_en: "Notice to Airmen".to_string(),
                decod_pt: "Aviso aos aeronavegantes".to_string(),
                explanation: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(term.slug, "notam");
    }

    #[tokio::test]
    async fn test_create_rejects_title_without_slug() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .create(CreateTermInput {
                title: "!!!".to_string(),
                decod_en: String::new(),
                decod_pt: String::new(),
                explanation: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_writes_history_then_term() {
        let mut updated = sample_term();
        updated.explanation = "Published by the aviation authority.".to_string();

        let history = term_history::Model {
            id: "hist1".to_string(),
            term_id: "term1".to_string(),
            previous_title: "NOTAM".to_string(),
            previous_decod_en: "Notice to Airmen".to_string(),
            previous_decod_pt: "Aviso aos aeronavegantes".to_string(),
            previous_explanation: String::new(),
            changed_by: Some("admin1".to_string()),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_term()]])
            .append_query_results([vec![history]])
            .append_query_results([vec![updated]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let term = service(db)
            .update(
                "notam",
                UpdateTermInput {
                    explanation: Some("Published by the aviation authority.".to_string()),
                    ..Default::default()
                },
                "admin1",
            )
            .await
            .unwrap();

        assert_eq!(term.explanation, "Published by the aviation authority.");
        assert_eq!(term.slug, "notam");
    }

    #[tokio::test]
    async fn test_add_video_rejects_unknown_url() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .add_video("notam", "https://vimeo.com/12345")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_link_returns_existing_case_insensitive() {
        let link = term_link::Model {
            id: "link1".to_string(),
            term_id: "term1".to_string(),
            url: "http://Example.com/notam".to_string(),
            label: String::new(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_term()]])
            .append_query_results([vec![link]]);

        let result = service(db)
            .add_link("notam", "example.com/NOTAM", "")
            .await
            .unwrap();
        assert_eq!(result.id, "link1");
    }

    #[tokio::test]
    async fn test_add_image_rejects_non_image() {
        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
        };
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .add_image("notam", &upload, ImageMeta::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
