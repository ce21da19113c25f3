//! Term listing and autocomplete.

use std::collections::HashMap;
use std::sync::Arc;

use aerodict_common::AppResult;
use aerodict_db::entities::{site_setting, term};
use aerodict_db::filters::TermFilter;
use aerodict_db::repositories::{SiteSettingRepository, TermPage, TermRepository, TermSearch};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Shortest query that autocomplete answers.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// Candidates fetched before ranking.
pub const AUTOCOMPLETE_CANDIDATES: u64 = 30;

/// Suggestions returned after ranking.
pub const AUTOCOMPLETE_LIMIT: usize = 8;

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteItem {
    pub slug: String,
    pub label: String,
    /// Portuguese decoding, or the English one when it is empty.
    pub decod: String,
}

/// Relevance of a candidate for `query` (already lowercased). Lower is better.
#[must_use]
pub fn rank(term: &term::Model, synonyms: &[String], query: &str) -> u8 {
    let title = term.title.to_lowercase();
    if title.starts_with(query) {
        return 0;
    }
    if title.contains(query) {
        return 1;
    }

    let synonyms: Vec<String> = synonyms.iter().map(|s| s.to_lowercase()).collect();
    if synonyms.iter().any(|s| s.starts_with(query)) {
        return 2;
    }
    if synonyms.iter().any(|s| s.contains(query)) {
        return 3;
    }

    let decodings = [term.decod_en.to_lowercase(), term.decod_pt.to_lowercase()];
    if decodings.iter().any(|d| d.starts_with(query)) {
        return 4;
    }
    if decodings.iter().any(|d| d.contains(query)) {
        return 5;
    }
    6
}

/// Order candidates by rank, then lowercased title, and keep the top entries.
#[must_use]
pub fn rank_candidates(
    candidates: Vec<term::Model>,
    synonyms: &HashMap<String, Vec<String>>,
    query: &str,
) -> Vec<AutocompleteItem> {
    let query = query.trim().to_lowercase();
    let mut ranked: Vec<(u8, String, term::Model)> = candidates
        .into_iter()
        .map(|t| {
            let names = synonyms.get(&t.id).map_or(&[][..], Vec::as_slice);
            (rank(&t, names, &query), t.title.to_lowercase(), t)
        })
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .take(AUTOCOMPLETE_LIMIT)
        .map(|(_, _, t)| AutocompleteItem {
            decod: if t.decod_pt.is_empty() {
                t.decod_en
            } else {
                t.decod_pt
            },
            slug: t.slug,
            label: t.title,
        })
        .collect()
}

/// Read-only term search.
#[derive(Clone)]
pub struct SearchService {
    term_repo: TermRepository,
    settings_repo: SiteSettingRepository,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            term_repo: TermRepository::new(db.clone()),
            settings_repo: SiteSettingRepository::new(db),
        }
    }

    /// Public listing. A `letter` outside A–Z is ignored.
    pub async fn list(&self, query: Option<&str>, letter: Option<&str>, page: u64) -> AppResult<TermPage> {
        let filters = letter
            .and_then(|l| TermFilter::parse("letter", l))
            .into_iter()
            .collect();
        self.admin_list(query, filters, page).await
    }

    /// Listing with any combination of admin filters.
    pub async fn admin_list(
        &self,
        query: Option<&str>,
        filters: Vec<TermFilter>,
        page: u64,
    ) -> AppResult<TermPage> {
        let settings = self.settings_repo.get_or_create().await?;
        let search = TermSearch {
            query: query.map(str::to_string),
            filters,
        };
        self.term_repo.search(&search, page, settings.page_size()).await
    }

    /// Top matches for a search box. Short queries and disabled autocomplete
    /// yield an empty list.
    pub async fn autocomplete(
        &self,
        settings: &site_setting::Model,
        query: &str,
    ) -> AppResult<Vec<AutocompleteItem>> {
        let query = query.trim();
        if !settings.enable_autocomplete || query.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Ok(vec![]);
        }

        let candidates = self
            .term_repo
            .find_matching(&TermSearch::text(query), AUTOCOMPLETE_CANDIDATES)
            .await?;
        let ids: Vec<String> = candidates.iter().map(|t| t.id.clone()).collect();

        let mut synonyms: HashMap<String, Vec<String>> = HashMap::new();
        for synonym in self.term_repo.find_synonyms_for(&ids).await? {
            synonyms.entry(synonym.term_id).or_default().push(synonym.name);
        }

        Ok(rank_candidates(candidates, &synonyms, query))
    }
}
