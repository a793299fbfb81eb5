//! Free-text search over listings.
//!
//! A query is split on whitespace and commas. Every term must occur,
//! case-insensitively, in at least one of the searched fields.

/// Parsed search terms, lowercased. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn parse(raw: Option<&str>) -> Self {
        let terms = raw
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self(terms)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn matches(&self, fields: &[&str]) -> bool {
        let fields: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
        self.0
            .iter()
            .all(|term| fields.iter().any(|field| field.contains(term.as_str())))
    }

    /// `ILIKE` patterns, one per term, with `%`, `_` and `\` escaped.
    pub fn like_patterns(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|term| {
                let escaped = term
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            })
            .collect()
    }
}
