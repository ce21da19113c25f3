//! Term history: snapshots, inline diffs and revert.
//!
//! A snapshot of the four text fields is written before every admin save of a
//! term and before a merge changes one. Reverting copies a snapshot back onto
//! the term without writing a new snapshot.

use std::sync::Arc;

use aerodict_common::{AppError, AppResult};
use aerodict_db::entities::{term, term_history};
use aerodict_db::repositories::{TermHistoryRepository, TermRepository};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use serde::Serialize;
use tracing::info;

/// Above this many LCS cells the diff degrades to a whole-field replacement.
const MAX_DIFF_CELLS: usize = 4_000_000;

/// The text fields a snapshot captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermText {
    pub title: String,
    pub decod_en: String,
    pub decod_pt: String,
    pub explanation: String,
}

impl TermText {
    /// Current text of a term.
    #[must_use]
    pub fn from_term(term: &term::Model) -> Self {
        Self {
            title: term.title.clone(),
            decod_en: term.decod_en.clone(),
            decod_pt: term.decod_pt.clone(),
            explanation: term.explanation.clone(),
        }
    }

    /// Text recorded in a snapshot.
    #[must_use]
    pub fn from_snapshot(entry: &term_history::Model) -> Self {
        Self {
            title: entry.previous_title.clone(),
            decod_en: entry.previous_decod_en.clone(),
            decod_pt: entry.previous_decod_pt.clone(),
            explanation: entry.previous_explanation.clone(),
        }
    }

    /// Overwrite the four text fields of `active`. Slug and media are untouched.
    pub fn apply_to(self, active: &mut term::ActiveModel) {
        active.title = Set(self.title);
        active.decod_en = Set(self.decod_en);
        active.decod_pt = Set(self.decod_pt);
        active.explanation = Set(self.explanation);
        active.updated_at = Set(Some(Utc::now().into()));
    }
}

/// Build the snapshot row for `term` as it is right now.
#[must_use]
pub fn snapshot(id: String, term: &term::Model, changed_by: Option<&str>) -> term_history::ActiveModel {
    term_history::ActiveModel {
        id: Set(id),
        term_id: Set(term.id.clone()),
        previous_title: Set(term.title.clone()),
        previous_decod_en: Set(term.decod_en.clone()),
        previous_decod_pt: Set(term.decod_pt.clone()),
        previous_explanation: Set(term.explanation.clone()),
        changed_by: Set(changed_by.map(str::to_string)),
        created_at: Set(Utc::now().into()),
    }
}

/// Diff of one field between a snapshot and the current term.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    pub field: &'static str,
    pub previous: String,
    pub current: String,
    pub changed: bool,
    /// Escaped HTML with `<del>`/`<ins>` around removed and added runs.
    pub html: String,
}

/// Snapshot compared against the current term.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDiff {
    pub entry: term_history::Model,
    pub fields: Vec<FieldDiff>,
}

/// Compare snapshot text with current text, field by field.
#[must_use]
pub fn diff_fields(previous: &TermText, current: &TermText) -> Vec<FieldDiff> {
    [
        ("title", &previous.title, &current.title),
        ("decodEn", &previous.decod_en, &current.decod_en),
        ("decodPt", &previous.decod_pt, &current.decod_pt),
        ("explanation", &previous.explanation, &current.explanation),
    ]
    .into_iter()
    .map(|(field, before, after)| FieldDiff {
        field,
        previous: before.clone(),
        current: after.clone(),
        changed: before != after,
        html: inline_diff(before, after),
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Character-level inline diff rendered as HTML.
///
/// Unchanged runs are escaped as-is, removed runs are wrapped in `<del>` and
/// added runs in `<ins>`. Very long inputs fall back to one replacement of the
/// differing middle.
#[must_use]
pub fn inline_diff(before: &str, after: &str) -> String {
    let a: Vec<char> = before.chars().collect();
    let b: Vec<char> = after.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut runs: Vec<(Op, String)> = Vec::new();
    push_run(&mut runs, Op::Equal, &a[..prefix]);
    if a_mid.len().saturating_mul(b_mid.len()) > MAX_DIFF_CELLS {
        push_run(&mut runs, Op::Delete, a_mid);
        push_run(&mut runs, Op::Insert, b_mid);
    } else {
        for (op, ch) in lcs_ops(a_mid, b_mid) {
            push_run(&mut runs, op, &[ch]);
        }
    }
    push_run(&mut runs, Op::Equal, &a[a.len() - suffix..]);

    let mut html = String::new();
    for (op, text) in runs {
        let text = html_escape(&text);
        match op {
            Op::Equal => html.push_str(&text),
            Op::Delete => html.push_str(&format!("<del>{text}</del>")),
            Op::Insert => html.push_str(&format!("<ins>{text}</ins>")),
        }
    }
    html
}

fn push_run(runs: &mut Vec<(Op, String)>, op: Op, chars: &[char]) {
    if chars.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some((last, text)) if *last == op => text.extend(chars),
        _ => runs.push((op, chars.iter().collect())),
    }
}

fn lcs_ops(a: &[char], b: &[char]) -> Vec<(Op, char)> {
    let width = b.len() + 1;
    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let mut table = vec![0u32; (a.len() + 1) * width];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            ops.push((Op::Equal, a[i]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push((Op::Delete, a[i]));
            i += 1;
        } else {
            ops.push((Op::Insert, b[j]));
            j += 1;
        }
    }
    ops.extend(a[i..].iter().map(|&c| (Op::Delete, c)));
    ops.extend(b[j..].iter().map(|&c| (Op::Insert, c)));
    ops
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// History listing, diff and revert for admins.
#[derive(Clone)]
pub struct HistoryService {
    term_repo: TermRepository,
    history_repo: TermHistoryRepository,
}

impl HistoryService {
    /// Create a new history service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            term_repo: TermRepository::new(db.clone()),
            history_repo: TermHistoryRepository::new(db),
        }
    }

    /// Snapshots of a term, newest first.
    pub async fn list(&self, slug: &str) -> AppResult<Vec<term_history::Model>> {
        let term = self.term_repo.get_by_slug(slug).await?;
        self.history_repo.find_by_term(&term.id).await
    }

    /// Compare one snapshot with the term's current text.
    pub async fn diff(&self, slug: &str, history_id: &str) -> AppResult<HistoryDiff> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let entry = self.find_entry(&term, history_id).await?;
        let fields = diff_fields(&TermText::from_snapshot(&entry), &TermText::from_term(&term));
        Ok(HistoryDiff { entry, fields })
    }

    /// Restore the newest snapshot.
    pub async fn revert_last(&self, slug: &str) -> AppResult<term::Model> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let entry = self
            .history_repo
            .find_latest(&term.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No history for term {slug}")))?;
        self.restore(term, &entry).await
    }

    /// Restore a specific snapshot of the term.
    pub async fn revert_to(&self, slug: &str, history_id: &str) -> AppResult<term::Model> {
        let term = self.term_repo.get_by_slug(slug).await?;
        let entry = self.find_entry(&term, history_id).await?;
        self.restore(term, &entry).await
    }

    async fn find_entry(&self, term: &term::Model, history_id: &str) -> AppResult<term_history::Model> {
        self.history_repo
            .find_for_term(&term.id, history_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("History entry {history_id}")))
    }

    async fn restore(&self, term: term::Model, entry: &term_history::Model) -> AppResult<term::Model> {
        let term_id = term.id.clone();
        let mut active: term::ActiveModel = term.into();
        TermText::from_snapshot(entry).apply_to(&mut active);
        let term = self.term_repo.update(active).await?;

        info!(term_id = %term_id, history_id = %entry.id, "Term reverted");
        Ok(term)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_term() -> term::Model {
        term::Model {
            id: "term1".to_string(),
            title: "IFR".to_string(),
            slug: "ifr".to_string(),
            decod_en: "Instrument Flight Rules".to_string(),
            decod_pt: "Regras de voo por instrumentos".to_string(),
            explanation: "Flying by reference to instruments.".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_entry() -> term_history::Model {
        term_history::Model {
            id: "hist1".to_string(),
            term_id: "term1".to_string(),
            previous_title: "I.F.R.".to_string(),
            previous_decod_en: "Instrument rules".to_string(),
            previous_decod_pt: "Regras".to_string(),
            previous_explanation: "Old text".to_string(),
            changed_by: Some("admin1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_inline_diff_marks_changes() {
        assert_eq!(inline_diff("abc", "abc"), "abc");
        assert_eq!(inline_diff("cat", "cart"), "ca<ins>r</ins>t");
        assert_eq!(inline_diff("cart", "cat"), "ca<del>r</del>t");
        assert_eq!(inline_diff("", "new"), "<ins>new</ins>");
        assert_eq!(inline_diff("old", ""), "<del>old</del>");
    }

    #[test]
    fn test_inline_diff_groups_replacements() {
        assert_eq!(inline_diff("flight", "fright"), "f<del>l</del><ins>r</ins>ight");
    }

    #[test]
    fn test_inline_diff_escapes_html() {
        assert_eq!(
            inline_diff("a<b", "a<b & c"),
            "a&lt;b<ins> &amp; c</ins>"
        );
    }

    #[test]
    fn test_inline_diff_handles_multibyte() {
        assert_eq!(inline_diff("decolagem", "decolágem"), "decol<del>a</del><ins>á</ins>gem");
    }

    #[test]
    fn test_diff_fields_flags_changed_fields() {
        let previous = TermText::from_snapshot(&sample_entry());
        let mut current = previous.clone();
        current.decod_pt = "Regras de voo".to_string();

        let fields = diff_fields(&previous, &current);
        let changed: Vec<&str> = fields.iter().filter(|f| f.changed).map(|f| f.field).collect();
        assert_eq!(changed, vec!["decodPt"]);
    }

    #[test]
    fn test_apply_snapshot_restores_exactly_text_fields() {
        let term = sample_term();
        let entry = sample_entry();
        let mut active: term::ActiveModel = term.clone().into();
        TermText::from_snapshot(&entry).apply_to(&mut active);

        assert_eq!(active.title, Set("I.F.R.".to_string()));
        assert_eq!(active.decod_en, Set("Instrument rules".to_string()));
        assert_eq!(active.decod_pt, Set("Regras".to_string()));
        assert_eq!(active.explanation, Set("Old text".to_string()));
        assert_eq!(active.slug.clone().unwrap(), term.slug);
        assert!(!active.slug.is_set());
    }

    #[test]
    fn test_snapshot_captures_current_text() {
        let term = sample_term();
        let row = snapshot("h".to_string(), &term, Some("admin1"));
        assert_eq!(row.previous_title, Set("IFR".to_string()));
        assert_eq!(row.term_id, Set("term1".to_string()));
        assert_eq!(row.changed_by, Set(Some("admin1".to_string())));
    }

    #[tokio::test]
    async fn test_revert_last_without_history_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_term()]])
            .append_query_results([Vec::<term_history::Model>::new()])
            .into_connection();

        let service = HistoryService::new(Arc::new(db));
        let result = service.revert_last("ifr").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revert_to_writes_snapshot_text() {
        let entry = sample_entry();
        let mut reverted = sample_term();
        reverted.title = entry.previous_title.clone();
        reverted.decod_en = entry.previous_decod_en.clone();
        reverted.decod_pt = entry.previous_decod_pt.clone();
        reverted.explanation = entry.previous_explanation.clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_term()]])
            .append_query_results([vec![entry]])
            .append_query_results([vec![reverted]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = HistoryService::new(Arc::new(db));
        let term = service.revert_to("ifr", "hist1").await.unwrap();
        assert_eq!(term.title, "I.F.R.");
        assert_eq!(term.slug, "ifr");
    }
}
