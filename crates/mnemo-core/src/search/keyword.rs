//! Keyword Query Sanitization
//!
//! The full-text matcher treats bare `AND`/`OR`/`NOT`/`NEAR`, `*`, `^`
//! and `:` as syntax. User queries are never trusted as syntax: every
//! term is wrapped in double quotes, which turns the whole query into
//! plain phrase terms. The LIKE fallback gets its own escaping.

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum characters of query text considered
pub const MAX_QUERY_CHARS: usize = 10_000;

/// Maximum number of terms kept after splitting
pub const MAX_QUERY_TERMS: usize = 100;

// ============================================================================
// SANITIZATION
// ============================================================================

/// Sanitize a raw query for the full-text MATCH operator
///
/// Order matters: truncate to [`MAX_QUERY_CHARS`], strip double quotes,
/// split on whitespace, keep the first [`MAX_QUERY_TERMS`] non-empty
/// terms, wrap each in double quotes, join with spaces. An empty return
/// means the query had no usable terms and the caller must not MATCH.
pub fn sanitize_match_query(query: &str) -> String {
    let truncated = match query.char_indices().nth(MAX_QUERY_CHARS) {
        Some((idx, _)) => &query[..idx],
        None => query,
    };

    let stripped = truncated.replace('"', "");

    stripped
        .split_whitespace()
        .filter(|term| !term.is_empty())
        .take(MAX_QUERY_TERMS)
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a `%…%` LIKE pattern with `%`, `_` and `\` escaped
///
/// Use with `LIKE ? ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        match c {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped.push('%');
    escaped
}

// ============================================================================
// TESTS
// ============================================================================
