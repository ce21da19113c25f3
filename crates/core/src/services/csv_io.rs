//! CSV import and export of terms.

use std::collections::HashSet;
use std::sync::Arc;

use aerodict_common::{
    AppError, AppResult, IdGenerator, extract_video_id, normalize_url, slugify, split_entries,
    strip_tags,
};
use aerodict_db::entities::{term, term_link, term_video};
use aerodict_db::repositories::{TermHistoryRepository, TermRepository};
use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, Writer};
use sea_orm::{DatabaseConnection, Set};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::history::{TermText, snapshot};

/// Lines searched for the header row.
const HEADER_SEARCH_LINES: usize = 10;

/// Header of exported files.
pub const EXPORT_HEADER: [&str; 4] = ["titulo", "decod_en", "decod_pt", "explicacao"];

const TITLE_COLUMNS: &[&str] = &["titulo", "título", "title", "sigla", "term"];
const DECOD_EN_COLUMNS: &[&str] = &["decod_en", "decodificação em inglês", "english", "en"];
const DECOD_PT_COLUMNS: &[&str] = &["decod_pt", "decodificação em português", "portuguese", "pt"];
const EXPLANATION_COLUMNS: &[&str] = &["explicacao", "explicação", "explanation", "resumo"];
const VIDEO_COLUMNS: &[&str] = &["videos", "vídeos", "youtube", "video_urls"];
const LINK_COLUMNS: &[&str] = &["links", "link", "urls"];

/// Column positions found in the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ColumnMap {
    title: usize,
    decod_en: Option<usize>,
    decod_pt: Option<usize>,
    explanation: Option<usize>,
    videos: Option<usize>,
    links: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Option<Self> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| names.iter().position(|n| n == c))
        };

        Some(Self {
            title: find(TITLE_COLUMNS)?,
            decod_en: find(DECOD_EN_COLUMNS),
            decod_pt: find(DECOD_PT_COLUMNS),
            explanation: find(EXPLANATION_COLUMNS),
            videos: find(VIDEO_COLUMNS),
            links: find(LINK_COLUMNS),
        })
    }
}

/// One data row, sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub title: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
    pub links: Vec<String>,
    pub videos: Vec<String>,
}

/// Counters of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub duplicates: u32,
    pub skipped: u32,
    pub links_added: u32,
    pub videos_added: u32,
}

impl ImportReport {
    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Created {}, updated {}, unchanged {}, duplicates {}, skipped {}; links added {}, videos added {}",
            self.created,
            self.updated,
            self.unchanged,
            self.duplicates,
            self.skipped,
            self.links_added,
            self.videos_added
        )
    }
}

fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
    if first.matches(';').count() > first.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse an uploaded file into rows. Rows before the header are ignored.
/// A row with an empty title comes back with an empty `title`.
pub fn parse_csv(data: &[u8]) -> AppResult<Vec<CsvRow>> {
    let text = String::from_utf8_lossy(data);
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let mut columns = None;
    for record in records.by_ref().take(HEADER_SEARCH_LINES) {
        if let Some(map) = ColumnMap::from_header(&record?) {
            columns = Some(map);
            break;
        }
    }
    let columns = columns.ok_or_else(|| {
        AppError::BadRequest(format!(
            "No header with a title column in the first {HEADER_SEARCH_LINES} lines"
        ))
    })?;
    debug!(?columns, "CSV header located");

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(strip_tags)
                .unwrap_or_default()
        };
        rows.push(CsvRow {
            title: cell(Some(columns.title)),
            decod_en: cell(columns.decod_en),
            decod_pt: cell(columns.decod_pt),
            explanation: cell(columns.explanation),
            links: split_entries(&cell(columns.links)),
            videos: split_entries(&cell(columns.videos)),
        });
    }
    Ok(rows)
}

/// Render all terms as CSV.
pub fn render_csv(terms: &[term::Model]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for t in terms {
        writer.write_record([&t.title, &t.decod_en, &t.decod_pt, &t.explanation])?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish CSV: {e}")))
}

/// Text an existing term gets from a row: non-empty cells that differ.
/// `None` when nothing would change.
#[must_use]
pub fn merge_row(current: &term::Model, row: &CsvRow) -> Option<TermText> {
    let mut text = TermText::from_term(current);
    let mut changed = false;
    for (target, value) in [
        (&mut text.title, &row.title),
        (&mut text.decod_en, &row.decod_en),
        (&mut text.decod_pt, &row.decod_pt),
        (&mut text.explanation, &row.explanation),
    ] {
        if !value.is_empty() && value.as_str() != target.as_str() {
            target.clone_from(value);
            changed = true;
        }
    }
    changed.then_some(text)
}

/// Bulk import and export.
#[derive(Clone)]
pub struct CsvService {
    term_repo: TermRepository,
    history_repo: TermHistoryRepository,
    id_gen: IdGenerator,
}

impl CsvService {
    /// Create a new CSV service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            term_repo: TermRepository::new(db.clone()),
            history_repo: TermHistoryRepository::new(db),
            id_gen: IdGenerator::new(),
        }
    }

    /// Import a file, creating or updating terms row by row.
    pub async fn import(&self, data: &[u8], changed_by: Option<&str>) -> AppResult<ImportReport> {
        let rows = parse_csv(data)?;
        let mut report = ImportReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for row in rows {
            if row.title.is_empty() {
                report.skipped += 1;
                continue;
            }
            let slug = slugify(&row.title);
            if slug.is_empty() {
                report.skipped += 1;
                continue;
            }
            if !seen.insert(slug.clone()) {
                report.duplicates += 1;
                continue;
            }

            let term = match self.term_repo.find_by_slug(&slug).await? {
                None => {
                    report.created += 1;
                    self.term_repo
                        .create(term::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            title: Set(row.title.clone()),
                            slug: Set(slug),
                            decod_en: Set(row.decod_en.clone()),
                            decod_pt: Set(row.decod_pt.clone()),
                            explanation: Set(row.explanation.clone()),
                            created_at: Set(Utc::now().into()),
                            updated_at: Set(None),
                        })
                        .await?
                }
                Some(existing) => match merge_row(&existing, &row) {
                    None => {
                        report.unchanged += 1;
                        existing
                    }
                    Some(text) => {
                        report.updated += 1;
                        self.history_repo
                            .create(snapshot(self.id_gen.generate(), &existing, changed_by))
                            .await?;
                        let mut active: term::ActiveModel = existing.into();
                        text.apply_to(&mut active);
                        self.term_repo.update(active).await?
                    }
                },
            };

            report.links_added += self.add_links(&term, &row.links).await?;
            report.videos_added += self.add_videos(&term, &row.videos).await?;
        }

        info!(
            created = report.created,
            updated = report.updated,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "CSV import finished"
        );
        Ok(report)
    }

    /// Every term as CSV, in title order.
    pub async fn export(&self) -> AppResult<Vec<u8>> {
        render_csv(&self.term_repo.find_all().await?)
    }

    async fn add_links(&self, term: &term::Model, entries: &[String]) -> AppResult<u32> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut known: HashSet<String> = self
            .term_repo
            .find_links(&term.id)
            .await?
            .into_iter()
            .map(|l| l.url.to_lowercase())
            .collect();

        let mut added = 0;
        for entry in entries {
            let Some(url) = normalize_url(entry) else {
                continue;
            };
            if !known.insert(url.to_lowercase()) {
                continue;
            }
            self.term_repo
                .create_link(term_link::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    term_id: Set(term.id.clone()),
                    url: Set(url),
                    label: Set(String::new()),
                    created_at: Set(Utc::now().into()),
                })
                .await?;
            added += 1;
        }
        Ok(added)
    }

    async fn add_videos(&self, term: &term::Model, entries: &[String]) -> AppResult<u32> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut known: HashSet<String> = self
            .term_repo
            .find_videos(&term.id)
            .await?
            .into_iter()
            .map(|v| v.video_id)
            .collect();

        let mut added = 0;
        for entry in entries {
            let Some(video_id) = extract_video_id(entry) else {
                warn!(term = %term.slug, url = %entry, "Skipping invalid video URL");
                continue;
            };
            if !known.insert(video_id.clone()) {
                continue;
            }
            self.term_repo
                .create_video(term_video::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    term_id: Set(term.id.clone()),
                    url: Set(entry.clone()),
                    video_id: Set(video_id),
                    created_at: Set(Utc::now().into()),
                })
                .await?;
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn notam() -> term::Model {
        term::Model {
            id: "t1".to_string(),
            title: "NOTAM".to_string(),
            slug: "notam".to_string(),
            decod_en: "Notice to Airmen".to_string(),
            decod_pt: String::new(),
            explanation: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_parse_finds_header_after_preamble() {
        let data = "Glossário exportado\n\nSigla,English,Portuguese,Resumo,Links\nIFR,Instrument Flight Rules,Regras de voo por instrumentos,,\"a.com, b.com\"\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "IFR");
        assert_eq!(rows[0].decod_pt, "Regras de voo por instrumentos");
        assert_eq!(rows[0].links, vec!["a.com", "b.com"]);
        assert!(rows[0].videos.is_empty());
    }

    #[test]
    fn test_parse_accepts_semicolons_and_bom() {
        let data = "\u{feff}titulo;decod_en;decod_pt\nVOR;VHF Omnidirectional Range;<b>Radiofarol</b>\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].title, "VOR");
        assert_eq!(rows[0].decod_pt, "Radiofarol");
    }

    #[test]
    fn test_parse_without_header_fails() {
        let data = "a,b,c\n1,2,3\n";
        assert!(matches!(parse_csv(data.as_bytes()), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_parse_short_rows() {
        let data = "title,english,portuguese\nATC\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].title, "ATC");
        assert_eq!(rows[0].decod_en, "");
    }

    #[test]
    fn test_merge_row_only_non_empty_differences() {
        let row = CsvRow {
            title: "NOTAM".to_string(),
            decod_en: String::new(),
            decod_pt: "Aviso aos aeronavegantes".to_string(),
            ..Default::default()
        };
        let text = merge_row(&notam(), &row).unwrap();
        assert_eq!(text.decod_en, "Notice to Airmen");
        assert_eq!(text.decod_pt, "Aviso aos aeronavegantes");

        let same = CsvRow {
            title: "NOTAM".to_string(),
            decod_en: "Notice to Airmen".to_string(),
            ..Default::default()
        };
        assert!(merge_row(&notam(), &same).is_none());
    }

    #[test]
    fn test_render_csv() {
        let out = render_csv(&[notam()]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "titulo,decod_en,decod_pt,explicacao\nNOTAM,Notice to Airmen,,\n"
        );
    }

    #[test]
    fn test_summary() {
        let report = ImportReport {
            created: 1,
            ..Default::default()
        };
        assert!(report.summary().starts_with("Created 1, updated 0"));
    }

    #[tokio::test]
    async fn test_import_creates_new_term() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<term::Model>::new()])
            .append_query_results([vec![notam()]])
            .into_connection();

        let report = CsvService::new(Arc::new(db))
            .import(b"titulo,decod_en\nNOTAM,Notice to Airmen\n", None)
            .await
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
    }

    #[tokio::test]
    async fn test_reimport_unchanged_and_duplicates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![notam()]])
            .into_connection();

        let report = CsvService::new(Arc::new(db))
            .import(
                b"titulo,decod_en\nNOTAM,Notice to Airmen\nnotam,Other\n,orphan\n",
                None,
            )
            .await
            .unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 0);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.skipped, 1);
    }
}
