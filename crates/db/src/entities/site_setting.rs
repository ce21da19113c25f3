//! Site setting entity.
//!
//! A single row (id = 1) holding branding, SEO, landing-page content and the
//! runtime toggles for search and suggestions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only row.
pub const SITE_SETTING_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    // Branding
    pub site_name: String,
    #[sea_orm(column_type = "Text")]
    pub default_meta_description: String,
    /// Storage key or absolute URL.
    pub default_og_image: String,
    pub site_logo: String,
    pub favicon: String,
    /// `#RRGGBB`
    pub primary_color: String,
    pub secondary_color: String,

    // SEO
    #[sea_orm(column_type = "Text")]
    pub meta_keywords: String,
    pub meta_title_suffix: String,
    pub enable_indexing: bool,
    #[sea_orm(column_type = "Text")]
    pub analytics_code: String,
    #[sea_orm(column_type = "Text")]
    pub robots_txt: String,

    // Hero
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

    // Listing and autocomplete
    pub items_per_page: i32,
    pub enable_autocomplete: bool,
    pub autocomplete_throttle_ms: i32,

    // Social and footer
    pub social_twitter: String,
    pub social_instagram: String,
    pub social_youtube: String,
    pub social_linkedin: String,
    pub footer_text: String,

    // Custom code
    #[sea_orm(column_type = "Text")]
    pub custom_css: String,
    #[sea_orm(column_type = "Text")]
    pub custom_js_head: String,
    #[sea_orm(column_type = "Text")]
    pub custom_js_body: String,

    // Suggestions
    pub suggestions_enabled: bool,
    pub suggestions_require_source: bool,
    pub suggestions_min_justification: i32,
    pub suggestion_max_image_mb: i32,
    pub suggestion_rate_limit_seconds: i32,

    // Landing sections
    pub show_about: bool,
    pub about_title: String,
    #[sea_orm(column_type = "Text")]
    pub about_html: String,
    pub show_features: bool,
    pub features_title: String,
    #[sea_orm(column_type = "Text")]
    pub features_html: String,
    pub show_how: bool,
    pub how_title: String,
    #[sea_orm(column_type = "Text")]
    pub how_html: String,
    pub show_faq: bool,
    pub faq_title: String,
    #[sea_orm(column_type = "Text")]
    pub faq_html: String,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: SITE_SETTING_ID,
            site_name: "Aerodicionário".to_string(),
            default_meta_description: "Glossário de termos e siglas da aviação para estudantes e profissionais do setor aéreo.".to_string(),
            default_og_image: String::new(),
            site_logo: String::new(),
            favicon: String::new(),
            primary_color: "#0e76e6".to_string(),
            secondary_color: "#065ec0".to_string(),
            meta_keywords: String::new(),
            meta_title_suffix: " - Aerodicionário".to_string(),
            enable_indexing: true,
            analytics_code: String::new(),
            robots_txt: "User-agent: *\nAllow: /\nSitemap: /sitemap.xml\n".to_string(),
            hero_title: "Seu guia de termos e siglas da aviação".to_string(),
            hero_subtitle: "Da cabine de comando ao solo, descubra a linguagem que move o céu.".to_string(),
            hero_eyebrow: "AERODICIONÁRIO".to_string(),
            hero_badge_text: "Simples, rápido e 100% gratuito.".to_string(),
            search_placeholder: "Buscar termos (ex.: IFR, NOTAM, APU)".to_string(),
            hero_image: String::new(),
            hero_image_alt: "Imagem de destaque".to_string(),
            cta_primary_text: "Consultar Dicionário".to_string(),
            cta_primary_url: "/dicionario/".to_string(),
            cta_secondary_text: "Saiba mais".to_string(),
            cta_secondary_url: "#sobre".to_string(),
            items_per_page: 12,
            enable_autocomplete: true,
            autocomplete_throttle_ms: 1000,
            social_twitter: String::new(),
            social_instagram: String::new(),
            social_youtube: String::new(),
            social_linkedin: String::new(),
            footer_text: String::new(),
            custom_css: String::new(),
            custom_js_head: String::new(),
            custom_js_body: String::new(),
            suggestions_enabled: true,
            suggestions_require_source: true,
            suggestions_min_justification: 15,
            suggestion_max_image_mb: 6,
            suggestion_rate_limit_seconds: 5,
            show_about: true,
            about_title: "Sobre o Aerodicionário".to_string(),
            about_html: "<p>O Aerodicionário reúne definições claras e objetivas para estudantes, entusiastas e profissionais do setor aéreo.</p>".to_string(),
            show_features: true,
            features_title: "Por que usar o Aerodicionário?".to_string(),
            features_html: "<ul><li>Conteúdo atualizado</li><li>Busca rápida</li><li>Acesso gratuito</li></ul>".to_string(),
            show_how: true,
            how_title: "Como funciona".to_string(),
            how_html: String::new(),
            show_faq: true,
            faq_title: "Perguntas frequentes".to_string(),
            faq_html: String::new(),
            updated_at: None,
        }
    }
}

impl Model {
    /// Page size for public listings, never below 1.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        u64::try_from(self.items_per_page.max(1)).unwrap_or(12)
    }
}
