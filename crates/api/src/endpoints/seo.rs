//! Crawler and probe routes served at the site root.

use aerodict_common::AppResult;
use aerodict_db::entities::term;
use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

use crate::{middleware::AppState, response};

/// Public path of the glossary index.
const LIST_PATH: &str = "/dicionario/";

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn url_entry(xml: &mut String, loc: &str, lastmod: Option<String>, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(loc)));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
    }
    xml.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
    xml.push_str(&format!("    <priority>{priority}</priority>\n"));
    xml.push_str("  </url>\n");
}

/// Render the sitemap: home and index monthly, each term weekly.
pub fn render_sitemap(site_url: &str, terms: &[term::Model]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    url_entry(&mut xml, &format!("{site_url}/"), None, "monthly", "0.5");
    url_entry(&mut xml, &format!("{site_url}{LIST_PATH}"), None, "monthly", "0.5");

    for term in terms {
        let lastmod = term
            .updated_at
            .unwrap_or(term.created_at)
            .format("%Y-%m-%d")
            .to_string();
        url_entry(
            &mut xml,
            &format!("{site_url}{LIST_PATH}{}/", term.slug),
            Some(lastmod),
            "weekly",
            "0.7",
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

async fn sitemap(State(state): State<AppState>) -> AppResult<Response> {
    let terms = state.term_service.all().await?;
    let body = render_sitemap(&state.site_url, &terms);

    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body).into_response())
}

async fn robots(State(state): State<AppState>) -> AppResult<Response> {
    Ok(response::text(state.site_settings_service.robots_txt().await?))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .route("/health", get(health))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn term(slug: &str) -> term::Model {
        let created = chrono::DateTime::parse_from_rfc3339("2025-03-01T12:00:00+00:00").unwrap();
        term::Model {
            id: slug.to_string(),
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            decod_en: String::new(),
            decod_pt: String::new(),
            explanation: String::new(),
            created_at: created,
            updated_at: None,
        }
    }

    #[test]
    fn test_sitemap_lists_static_pages_and_terms() {
        let xml = render_sitemap("https://aerodict.example", &[term("ifr"), term("notam")]);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://aerodict.example/</loc>"));
        assert!(xml.contains("<loc>https://aerodict.example/dicionario/</loc>"));
        assert!(xml.contains("<loc>https://aerodict.example/dicionario/ifr/</loc>"));
        assert!(xml.contains("<loc>https://aerodict.example/dicionario/notam/</loc>"));
        assert!(xml.contains("<lastmod>2025-03-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 4);
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
