use super::QueryError;
use log::warn;
use regex::{Regex, RegexBuilder};

/// Keywords that may not appear as whole words, checked in this order
const FORBIDDEN_KEYWORDS: [&str; 11] = [
    "DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "CREATE", "TRUNCATE", "EXEC", "EXECUTE",
    "GRANT", "REVOKE",
];

const DANGEROUS_PATTERNS: [&str; 5] = [
    r";\s*(DROP|DELETE|INSERT|UPDATE|ALTER|CREATE)",
    r"--",
    r"/\*.*?\*/",
    r"';",
    r"UNION.*SELECT",
];

/// Statements may only start with one of these
const READ_ONLY_PREFIXES: [&str; 2] = ["SELECT", "WITH"];

/// Trims a query and collapses every whitespace run to a single space
pub fn sanitize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keyword and pattern screen for read-only queries.
///
/// This is a heuristic filter, not a security boundary: the engine's own
/// permissions are what actually prevent writes.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    keywords: Vec<(&'static str, Regex)>,
    patterns: Vec<Regex>,
}

impl QueryValidator {
    pub fn new() -> Result<Self, regex::Error> {
        let keywords = FORBIDDEN_KEYWORDS
            .iter()
            .map(|kw| {
                RegexBuilder::new(&format!(r"\b{kw}\b"))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*kw, re))
            })
            .collect::<Result<_, _>>()?;

        let patterns = DANGEROUS_PATTERNS
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { keywords, patterns })
    }

    pub fn validate(&self, query: &str) -> Result<(), QueryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }

        if let Some(&(keyword, _)) = self.keywords.iter().find(|(_, re)| re.is_match(trimmed)) {
            warn!("Rejected query containing {}", keyword);
            return Err(QueryError::ForbiddenKeyword(keyword));
        }

        if self.patterns.iter().any(|re| re.is_match(trimmed)) {
            warn!("Rejected query matching a dangerous pattern");
            return Err(QueryError::DangerousPattern);
        }

        let upper = trimmed.to_uppercase();
        if !READ_ONLY_PREFIXES.iter().any(|p| upper.starts_with(p)) {
            return Err(QueryError::NotSelect);
        }

        Ok(())
    }
}
