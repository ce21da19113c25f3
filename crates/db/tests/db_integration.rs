//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `aerodict_test`)
//!   `TEST_DB_PASSWORD` (default: `aerodict_test`)
//!   `TEST_DB_NAME` (default: `aerodict_test`)

#![allow(clippy::unwrap_used)]

use aerodict_db::TermFilter;
use aerodict_db::entities::{term, term_synonym};
use aerodict_db::repositories::{SiteSettingRepository, TermRepository, TermSearch};
use aerodict_db::test_utils::{TestDatabase, TestDbConfig};
use chrono::Utc;
use sea_orm::Set;

fn new_term(id: &str, title: &str, decod_en: &str) -> term::ActiveModel {
    term::ActiveModel {
        id: Set(id.to_string()),
        title: Set(title.to_string()),
        slug: Set(title.to_lowercase()),
        decod_en: Set(decod_en.to_string()),
        decod_pt: Set(String::new()),
        explanation: Set(String::new()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let result = TestDatabase::new().await;
    assert!(result.is_ok(), "Failed to migrate: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_site_setting_singleton() {
    let db = TestDatabase::new().await.unwrap();
    db.cleanup().await.unwrap();

    let repo = SiteSettingRepository::new(db.connection());
    let first = repo.get_or_create().await.unwrap();
    let second = repo.get_or_create().await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.items_per_page, 12);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_search_matches_synonyms_and_letter() {
    let db = TestDatabase::new().await.unwrap();
    db.cleanup().await.unwrap();

    let repo = TermRepository::new(db.connection());
    repo.create(new_term("t1", "IFR", "Instrument Flight Rules"))
        .await
        .unwrap();
    repo.create(new_term("t2", "VFR", "Visual Flight Rules"))
        .await
        .unwrap();
    repo.create_synonym(term_synonym::ActiveModel {
        id: Set("s1".to_string()),
        term_id: Set("t2".to_string()),
        name: Set("Regras de voo visual".to_string()),
    })
    .await
    .unwrap();

    let page = repo
        .search(&TermSearch::text("flight"), 1, 12)
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let page = repo
        .search(&TermSearch::text("VOO VISUAL"), 1, 12)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].slug, "vfr");

    let search = TermSearch {
        query: None,
        filters: vec![TermFilter::StartingLetter('i')],
    };
    let page = repo.search(&search, 99, 12).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.items[0].title, "IFR");
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}
