//! Free-text trip search.
//!
//! A query is split on whitespace into terms. A trip matches when every term
//! is a case-insensitive substring of at least one searchable field. The same
//! terms drive the SQL `ILIKE` predicate (see [`SearchQuery::like_patterns`])
//! and the in-memory filter applied to the dashboard list.

use crate::types::Timestamp;

/// Format used when matching against a trip's start time.
pub const START_TIME_SEARCH_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Every term is kept; repeated terms collapse to one.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut terms: Vec<String> = Vec::new();
        for term in raw.unwrap_or_default().split_whitespace() {
            let term = term.to_lowercase();
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// One `%term%` pattern per term, with `LIKE` wildcards escaped.
    pub fn like_patterns(&self) -> Vec<String> {
        self.terms
            .iter()
            .map(|t| format!("%{}%", escape_like(t)))
            .collect()
    }

    /// AND across terms, OR across fields.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        self.terms.iter().all(|term| {
            fields
                .clone()
                .into_iter()
                .any(|field| field.to_lowercase().contains(term.as_str()))
        })
    }
}

/// Escape `\`, `%` and `_` for use inside a `LIKE` pattern.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn format_start_time(start_time: Timestamp) -> String {
    start_time.format(START_TIME_SEARCH_FORMAT).to_string()
}
