//! Text helpers shared by submission, merge and import paths.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag regex is valid"));

static ENTRY_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;]+").expect("separator regex is valid"));

/// Remove HTML tags and comments, then trim.
///
/// Tags are removed repeatedly so that nested fragments such as
/// `<<b>script>` do not leave a tag behind.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    let mut text = COMMENT_RE.replace_all(input, "").into_owned();
    loop {
        let next = TAG_RE.replace_all(&text, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }
    text.trim().to_string()
}

/// Derive a URL slug: accents folded to ASCII, lowercase, runs of
/// whitespace and hyphens collapsed to a single `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.to_lowercase().chars() {
        let ch = fold_accent(ch);
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

const fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Prefix `http://` when a URL carries no scheme. Returns `None` for blank input.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("http://{}", url.trim_start_matches('/')))
    }
}

/// Split a free-text cell into entries separated by whitespace, commas or
/// semicolons.
#[must_use]
pub fn split_entries(raw: &str) -> Vec<String> {
    ENTRY_SPLIT_RE
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
