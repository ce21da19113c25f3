//! Site settings service.
//!
//! Branding, SEO, landing-page content and runtime toggles live in a single
//! database row that administrators edit at runtime.

use std::sync::LazyLock;

use aerodict_common::{AppError, AppResult};
use aerodict_db::{entities::site_setting, repositories::SiteSettingRepository};
use chrono::Utc;
use regex::Regex;
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::media::{ImageUpload, MediaService};

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color regex is valid"));

/// Body served at `/robots.txt` when indexing is disabled.
pub const DISALLOW_ALL_ROBOTS: &str = "User-agent: *\nDisallow: /";

/// Storage directory of uploaded branding images.
pub const BRANDING_DIR: &str = "branding";

/// Settings that hold an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandingImage {
    Logo,
    Favicon,
    OgImage,
    HeroImage,
}

impl BrandingImage {
    /// Parse the path segment naming a slot.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "logo" => Some(Self::Logo),
            "favicon" => Some(Self::Favicon),
            "og-image" => Some(Self::OgImage),
            "hero-image" => Some(Self::HeroImage),
            _ => None,
        }
    }

    fn current(self, settings: &site_setting::Model) -> &str {
        match self {
            Self::Logo => &settings.site_logo,
            Self::Favicon => &settings.favicon,
            Self::OgImage => &settings.default_og_image,
            Self::HeroImage => &settings.hero_image,
        }
    }

    fn assign(self, active: &mut site_setting::ActiveModel, key: String) {
        match self {
            Self::Logo => active.site_logo = Set(key),
            Self::Favicon => active.favicon = Set(key),
            Self::OgImage => active.default_og_image = Set(key),
            Self::HeroImage => active.hero_image = Set(key),
        }
    }
}

/// Partial update of the settings row. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteSettingsInput {
    #[validate(length(min = 1, max = 120))]
    pub site_name: Option<String>,
    pub default_meta_description: Option<String>,
    pub default_og_image: Option<String>,
    pub site_logo: Option<String>,
    pub favicon: Option<String>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "expected #RRGGBB"))]
    pub primary_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "expected #RRGGBB"))]
    pub secondary_color: Option<String>,
    pub meta_keywords: Option<String>,
    #[validate(length(max = 60))]
    pub meta_title_suffix: Option<String>,
    pub enable_indexing: Option<bool>,
    pub analytics_code: Option<String>,
    pub robots_txt: Option<String>,
    #[validate(length(max = 200))]
    pub hero_title: Option<String>,
    #[validate(length(max = 240))]
    pub hero_subtitle: Option<String>,
    #[validate(length(max = 80))]
    pub hero_eyebrow: Option<String>,
    #[validate(length(max = 140))]
    pub hero_badge_text: Option<String>,
    #[validate(length(max = 160))]
    pub search_placeholder: Option<String>,
    pub hero_image: Option<String>,
    #[validate(length(max = 150))]
    pub hero_image_alt: Option<String>,
    #[validate(length(max = 40))]
    pub cta_primary_text: Option<String>,
    pub cta_primary_url: Option<String>,
    #[validate(length(max = 40))]
    pub cta_secondary_text: Option<String>,
    pub cta_secondary_url: Option<String>,
    #[validate(range(min = 1, max = 200))]
    pub items_per_page: Option<i32>,
    pub enable_autocomplete: Option<bool>,
    #[validate(range(min = 0, max = 60000))]
    pub autocomplete_throttle_ms: Option<i32>,
    pub social_twitter: Option<String>,
    pub social_instagram: Option<String>,
    pub social_youtube: Option<String>,
    pub social_linkedin: Option<String>,
    #[validate(length(max = 200))]
    pub footer_text: Option<String>,
    pub custom_css: Option<String>,
    pub custom_js_head: Option<String>,
    pub custom_js_body: Option<String>,
    pub suggestions_enabled: Option<bool>,
    pub suggestions_require_source: Option<bool>,
    #[validate(range(min = 0, max = 2000))]
    pub suggestions_min_justification: Option<i32>,
    #[validate(range(min = 1, max = 64))]
    pub suggestion_max_image_mb: Option<i32>,
    #[validate(range(min = 0, max = 86400))]
    pub suggestion_rate_limit_seconds: Option<i32>,
    pub show_about: Option<bool>,
    #[validate(length(max = 120))]
    pub about_title: Option<String>,
    pub about_html: Option<String>,
    pub show_features: Option<bool>,
    #[validate(length(max = 120))]
    pub features_title: Option<String>,
    pub features_html: Option<String>,
    pub show_how: Option<bool>,
    #[validate(length(max = 120))]
    pub how_title: Option<String>,
    pub how_html: Option<String>,
    pub show_faq: Option<bool>,
    #[validate(length(max = 120))]
    pub faq_title: Option<String>,
    pub faq_html: Option<String>,
}

/// The part of the settings the public site needs to render itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSiteSettings {
    pub site_name: String,
    pub default_meta_description: String,
    pub default_og_image: String,
    pub site_logo: String,
    pub favicon: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub meta_keywords: String,
    pub meta_title_suffix: String,
    pub enable_indexing: bool,
    pub analytics_code: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_eyebrow: String,
    pub hero_badge_text: String,
    pub search_placeholder: String,
    pub hero_image: String,
    pub hero_image_alt: String,
    pub cta_primary_text: String,
    pub cta_primary_url: String,
    pub cta_secondary_text: String,
    pub cta_secondary_url: String,
    pub items_per_page: i32,
    pub enable_autocomplete: bool,
    pub autocomplete_throttle_ms: i32,
    pub social_twitter: String,
    pub social_instagram: String,
    pub social_youtube: String,
    pub social_linkedin: String,
    pub footer_text: String,
    pub custom_css: String,
    pub custom_js_head: String,
    pub custom_js_body: String,
    pub suggestions_enabled: bool,
    pub suggestions_require_source: bool,
    pub suggestions_min_justification: i32,
    pub suggestion_max_image_mb: i32,
    pub show_about: bool,
    pub about_title: String,
    pub about_html: String,
    pub show_features: bool,
    pub features_title: String,
    pub features_html: String,
    pub show_how: bool,
    pub how_title: String,
    pub how_html: String,
    pub show_faq: bool,
    pub faq_title: String,
    pub faq_html: String,
}

impl From<&site_setting::Model> for PublicSiteSettings {
    fn from(settings: &site_setting::Model) -> Self {
        Self {
            site_name: settings.site_name.clone(),
            default_meta_description: settings.default_meta_description.clone(),
            default_og_image: settings.default_og_image.clone(),
            site_logo: settings.site_logo.clone(),
            favicon: settings.favicon.clone(),
            primary_color: settings.primary_color.clone(),
            secondary_color: settings.secondary_color.clone(),
            meta_keywords: settings.meta_keywords.clone(),
            meta_title_suffix: settings.meta_title_suffix.clone(),
            enable_indexing: settings.enable_indexing,
            analytics_code: settings.analytics_code.clone(),
            hero_title: settings.hero_title.clone(),
            hero_subtitle: settings.hero_subtitle.clone(),
            hero_eyebrow: settings.hero_eyebrow.clone(),
            hero_badge_text: settings.hero_badge_text.clone(),
            search_placeholder: settings.search_placeholder.clone(),
            hero_image: settings.hero_image.clone(),
            hero_image_alt: settings.hero_image_alt.clone(),
            cta_primary_text: settings.cta_primary_text.clone(),
            cta_primary_url: settings.cta_primary_url.clone(),
            cta_secondary_text: settings.cta_secondary_text.clone(),
            cta_secondary_url: settings.cta_secondary_url.clone(),
            items_per_page: settings.items_per_page,
            enable_autocomplete: settings.enable_autocomplete,
            autocomplete_throttle_ms: settings.autocomplete_throttle_ms,
            social_twitter: settings.social_twitter.clone(),
            social_instagram: settings.social_instagram.clone(),
            social_youtube: settings.social_youtube.clone(),
            social_linkedin: settings.social_linkedin.clone(),
            footer_text: settings.footer_text.clone(),
            custom_css: settings.custom_css.clone(),
            custom_js_head: settings.custom_js_head.clone(),
            custom_js_body: settings.custom_js_body.clone(),
            suggestions_enabled: settings.suggestions_enabled,
            suggestions_require_source: settings.suggestions_require_source,
            suggestions_min_justification: settings.suggestions_min_justification,
            suggestion_max_image_mb: settings.suggestion_max_image_mb,
            show_about: settings.show_about,
            about_title: settings.about_title.clone(),
            about_html: settings.about_html.clone(),
            show_features: settings.show_features,
            features_title: settings.features_title.clone(),
            features_html: settings.features_html.clone(),
            show_how: settings.show_how,
            how_title: settings.how_title.clone(),
            how_html: settings.how_html.clone(),
            show_faq: settings.show_faq,
            faq_title: settings.faq_title.clone(),
            faq_html: settings.faq_html.clone(),
        }
    }
}

/// Site settings service.
#[derive(Clone)]
pub struct SiteSettingsService {
    repo: SiteSettingRepository,
    media: MediaService,
}

impl SiteSettingsService {
    /// Create a new site settings service.
    #[must_use]
    pub const fn new(repo: SiteSettingRepository, media: MediaService) -> Self {
        Self { repo, media }
    }

    /// Current settings, created with defaults on first access.
    pub async fn get(&self) -> AppResult<site_setting::Model> {
        self.repo.get_or_create().await
    }

    /// Public subset of the current settings, with uploaded images as URLs.
    pub async fn public(&self) -> AppResult<PublicSiteSettings> {
        let settings = self.get().await?;
        let mut public = PublicSiteSettings::from(&settings);
        public.site_logo = self.asset_url(&settings.site_logo);
        public.favicon = self.asset_url(&settings.favicon);
        public.default_og_image = self.asset_url(&settings.default_og_image);
        public.hero_image = self.asset_url(&settings.hero_image);
        Ok(public)
    }

    /// Store an uploaded branding image and point its setting at it. A
    /// previously uploaded file in that slot is removed.
    pub async fn upload_branding(
        &self,
        slot: BrandingImage,
        upload: &ImageUpload,
    ) -> AppResult<site_setting::Model> {
        if !upload.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "{} is not an image",
                upload.file_name
            )));
        }

        let current = self.get().await?;
        let previous = slot.current(&current).to_string();
        let stored = self.media.save_image(BRANDING_DIR, upload, &[]).await?;

        let mut active = current.into_active_model();
        slot.assign(&mut active, stored.key.clone());
        active.updated_at = Set(Some(Utc::now().into()));

        let settings = match self.repo.update(active).await {
            Ok(settings) => settings,
            Err(e) => {
                if let Err(cleanup) = self.media.delete_image(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "Failed to remove unused branding image");
                }
                return Err(e);
            }
        };

        if previous.starts_with(&format!("{BRANDING_DIR}/")) && previous != stored.key {
            if let Err(e) = self.media.delete_image(&previous).await {
                warn!(key = %previous, error = %e, "Failed to remove replaced branding image");
            }
        }

        info!(slot = ?slot, key = %stored.key, "Branding image updated");
        Ok(settings)
    }

    /// Storage keys become public URLs; absolute URLs and paths pass through.
    fn asset_url(&self, value: &str) -> String {
        if value.is_empty() || value.starts_with('/') || value.contains("://") {
            value.to_string()
        } else {
            self.media.url(value)
        }
    }

    /// Apply a partial update.
    pub async fn update(&self, input: UpdateSiteSettingsInput) -> AppResult<site_setting::Model> {
        input.validate()?;

        let current = self.get().await?;
        let mut active = current.into_active_model();

        if let Some(v) = input.site_name {
            active.site_name = Set(v);
        }
        if let Some(v) = input.default_meta_description {
            active.default_meta_description = Set(v);
        }
        if let Some(v) = input.default_og_image {
            active.default_og_image = Set(v);
        }
        if let Some(v) = input.site_logo {
            active.site_logo = Set(v);
        }
        if let Some(v) = input.favicon {
            active.favicon = Set(v);
        }
        if let Some(v) = input.primary_color {
            active.primary_color = Set(v);
        }
        if let Some(v) = input.secondary_color {
            active.secondary_color = Set(v);
        }
        if let Some(v) = input.meta_keywords {
            active.meta_keywords = Set(v);
        }
        if let Some(v) = input.meta_title_suffix {
            active.meta_title_suffix = Set(v);
        }
        if let Some(v) = input.enable_indexing {
            active.enable_indexing = Set(v);
        }
        if let Some(v) = input.analytics_code {
            active.analytics_code = Set(v);
        }
        if let Some(v) = input.robots_txt {
            active.robots_txt = Set(v);
        }
        if let Some(v) = input.hero_title {
            active.hero_title = Set(v);
        }
        if let Some(v) = input.hero_subtitle {
            active.hero_subtitle = Set(v);
        }
        if let Some(v) = input.hero_eyebrow {
            active.hero_eyebrow = Set(v);
        }
        if let Some(v) = input.hero_badge_text {
            active.hero_badge_text = Set(v);
        }
        if let Some(v) = input.search_placeholder {
            active.search_placeholder = Set(v);
        }
        if let Some(v) = input.hero_image {
            active.hero_image = Set(v);
        }
        if let Some(v) = input.hero_image_alt {
            active.hero_image_alt = Set(v);
        }
        if let Some(v) = input.cta_primary_text {
            active.cta_primary_text = Set(v);
        }
        if let Some(v) = input.cta_primary_url {
            active.cta_primary_url = Set(v);
        }
        if let Some(v) = input.cta_secondary_text {
            active.cta_secondary_text = Set(v);
        }
        if let Some(v) = input.cta_secondary_url {
            active.cta_secondary_url = Set(v);
        }
        if let Some(v) = input.items_per_page {
            active.items_per_page = Set(v);
        }
        if let Some(v) = input.enable_autocomplete {
            active.enable_autocomplete = Set(v);
        }
        if let Some(v) = input.autocomplete_throttle_ms {
            active.autocomplete_throttle_ms = Set(v);
        }
        if let Some(v) = input.social_twitter {
            active.social_twitter = Set(v);
        }
        if let Some(v) = input.social_instagram {
            active.social_instagram = Set(v);
        }
        if let Some(v) = input.social_youtube {
            active.social_youtube = Set(v);
        }
        if let Some(v) = input.social_linkedin {
            active.social_linkedin = Set(v);
        }
        if let Some(v) = input.footer_text {
            active.footer_text = Set(v);
        }
        if let Some(v) = input.custom_css {
            active.custom_css = Set(v);
        }
        if let Some(v) = input.custom_js_head {
            active.custom_js_head = Set(v);
        }
        if let Some(v) = input.custom_js_body {
            active.custom_js_body = Set(v);
        }
        if let Some(v) = input.suggestions_enabled {
            active.suggestions_enabled = Set(v);
        }
        if let Some(v) = input.suggestions_require_source {
            active.suggestions_require_source = Set(v);
        }
        if let Some(v) = input.suggestions_min_justification {
            active.suggestions_min_justification = Set(v);
        }
        if let Some(v) = input.suggestion_max_image_mb {
            active.suggestion_max_image_mb = Set(v);
        }
        if let Some(v) = input.suggestion_rate_limit_seconds {
            active.suggestion_rate_limit_seconds = Set(v);
        }
        if let Some(v) = input.show_about {
            active.show_about = Set(v);
        }
        if let Some(v) = input.about_title {
            active.about_title = Set(v);
        }
        if let Some(v) = input.about_html {
            active.about_html = Set(v);
        }
        if let Some(v) = input.show_features {
            active.show_features = Set(v);
        }
        if let Some(v) = input.features_title {
            active.features_title = Set(v);
        }
        if let Some(v) = input.features_html {
            active.features_html = Set(v);
        }
        if let Some(v) = input.show_how {
            active.show_how = Set(v);
        }
        if let Some(v) = input.how_title {
            active.how_title = Set(v);
        }
        if let Some(v) = input.how_html {
            active.how_html = Set(v);
        }
        if let Some(v) = input.show_faq {
            active.show_faq = Set(v);
        }
        if let Some(v) = input.faq_title {
            active.faq_title = Set(v);
        }
        if let Some(v) = input.faq_html {
            active.faq_html = Set(v);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.repo.update(active).await
    }

    /// Body of `/robots.txt`.
    pub async fn robots_txt(&self) -> AppResult<String> {
        Ok(robots_body(&self.get().await?))
    }
}

/// `robots.txt` for the given settings.
#[must_use]
pub fn robots_body(settings: &site_setting::Model) -> String {
    if settings.enable_indexing {
        settings.robots_txt.clone()
    } else {
        DISALLOW_ALL_ROBOTS.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aerodict_common::{MemoryStorage, StorageBackend};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn media() -> MediaService {
        MediaService::new(Arc::new(MemoryStorage::new("/media")))
    }

    #[test]
    fn test_robots_body_respects_indexing() {
        let mut settings = site_setting::Model::default();
        assert!(robots_body(&settings).contains("Allow: /"));

        settings.enable_indexing = false;
        assert_eq!(robots_body(&settings), "User-agent: *\nDisallow: /");
    }

    #[test]
    fn test_update_input_validates_colors() {
        let input = UpdateSiteSettingsInput {
            primary_color: Some("blue".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = UpdateSiteSettingsInput {
            primary_color: Some("#0E76E6".to_string()),
            items_per_page: Some(24),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_zero_page_size() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = SiteSettingsService::new(SiteSettingRepository::new(db), media());

        let result = service
            .update(UpdateSiteSettingsInput {
                items_per_page: Some(0),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_applies_present_fields_only() {
        let current = site_setting::Model::default();
        let mut updated = current.clone();
        updated.site_name = "Aerodict".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[current]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let service = SiteSettingsService::new(SiteSettingRepository::new(db), media());

        let result = service
            .update(UpdateSiteSettingsInput {
                site_name: Some("Aerodict".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.site_name, "Aerodict");
        assert_eq!(result.items_per_page, 12);
    }

    #[tokio::test]
    async fn test_public_settings_resolve_uploaded_images() {
        let settings = site_setting::Model {
            site_logo: "branding/logo.png".to_string(),
            hero_image: "https://cdn.example/hero.jpg".to_string(),
            ..Default::default()
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[settings]])
                .into_connection(),
        );
        let service = SiteSettingsService::new(SiteSettingRepository::new(db), media());

        let public = service.public().await.unwrap();
        assert_eq!(public.site_logo, "/media/branding/logo.png");
        assert_eq!(public.hero_image, "https://cdn.example/hero.jpg");
        assert_eq!(public.favicon, "");
    }

    #[tokio::test]
    async fn test_branding_upload_replaces_previous_file() {
        let storage = Arc::new(MemoryStorage::new("/media"));
        storage
            .upload("branding/old.png", b"old", "image/png")
            .await
            .unwrap();

        let current = site_setting::Model {
            site_logo: "branding/old.png".to_string(),
            ..Default::default()
        };
        let updated = site_setting::Model {
            site_logo: "branding/logo.png".to_string(),
            ..Default::default()
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[current]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let service = SiteSettingsService::new(
            SiteSettingRepository::new(db),
            MediaService::new(storage.clone()),
        );

        let upload = ImageUpload {
            file_name: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            data: b"new".to_vec(),
        };
        let settings = service
            .upload_branding(BrandingImage::Logo, &upload)
            .await
            .unwrap();

        assert_eq!(settings.site_logo, "branding/logo.png");
        assert_eq!(storage.keys().await, vec!["branding/logo.png".to_string()]);
    }

    #[tokio::test]
    async fn test_branding_upload_rejects_non_image() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = SiteSettingsService::new(SiteSettingRepository::new(db), media());

        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
        };
        let result = service.upload_branding(BrandingImage::Favicon, &upload).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_branding_slot_names() {
        assert_eq!(BrandingImage::parse("og-image"), Some(BrandingImage::OgImage));
        assert_eq!(BrandingImage::parse("hero-image"), Some(BrandingImage::HeroImage));
        assert_eq!(BrandingImage::parse("banner"), None);
    }

    #[test]
    fn test_public_settings_hide_robots() {
        let public = PublicSiteSettings::from(&site_setting::Model::default());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("robotsTxt").is_none());
        assert_eq!(json["itemsPerPage"], 12);
    }
}
