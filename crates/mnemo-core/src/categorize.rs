//! Auto-Categorization
//!
//! Derives a coarse category tag for an observation from its type,
//! text fields, and touched file paths. The rule table is fixed and
//! ordered by decreasing specificity; identical inputs always produce
//! identical outputs.
//!
//! Scoring per rule:
//! - +weight for each keyword found as a lowercase substring of the
//!   concatenated text fields
//! - +2×weight when the observation type is in the rule's type set
//! - +weight per file-path pattern hit on the concatenated file list
//!
//! The highest-scoring rule names the category; an all-zero score falls
//! back to `general`.

use regex::Regex;
use std::sync::LazyLock;

/// Category assigned when no rule scores
pub const FALLBACK_CATEGORY: &str = "general";

// ============================================================================
// RULE TABLE
// ============================================================================

/// One weighted categorization rule
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    /// Category name this rule produces
    pub name: &'static str,
    /// Base weight (keyword and file hits score this; type hits 2×)
    pub weight: u32,
    /// Lowercase substrings matched against the text fields
    pub keywords: &'static [&'static str],
    /// Observation types that strongly indicate this category
    pub types: &'static [&'static str],
    /// Pattern matched against the comma-joined file paths
    pub file_pattern: Option<&'static str>,
}

/// The fixed rule table, in decreasing specificity
pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "security",
        weight: 10,
        keywords: &[
            "security",
            "vulnerability",
            "auth",
            "password",
            "secret",
            "encrypt",
            "credential",
            "injection",
            "cve",
        ],
        types: &["security"],
        file_pattern: Some(r"(?i)(auth|security|crypto|secrets?)"),
    },
    CategoryRule {
        name: "testing",
        weight: 8,
        keywords: &["test", "spec", "coverage", "assert", "mock", "fixture", "flaky"],
        types: &["test"],
        file_pattern: Some(r"(?i)(_test\.|\.test\.|tests?/|/spec/)"),
    },
    CategoryRule {
        name: "debugging",
        weight: 8,
        keywords: &[
            "bug",
            "debug",
            "fix",
            "error",
            "crash",
            "panic",
            "stack trace",
            "regression",
        ],
        types: &["bugfix", "debug"],
        file_pattern: None,
    },
    CategoryRule {
        name: "architecture",
        weight: 7,
        keywords: &[
            "architecture",
            "design",
            "boundary",
            "interface",
            "schema",
            "migration",
            "tradeoff",
        ],
        types: &["decision", "constraint"],
        file_pattern: Some(r"(?i)(adr|design|schema|migrations?)"),
    },
    CategoryRule {
        name: "refactoring",
        weight: 6,
        keywords: &["refactor", "cleanup", "rename", "simplify", "extract", "dead code"],
        types: &["refactor"],
        file_pattern: None,
    },
    CategoryRule {
        name: "config",
        weight: 5,
        keywords: &["config", "configuration", "environment", "settings", "env var", "flag"],
        types: &["config"],
        file_pattern: Some(r"(?i)(\.toml|\.ya?ml|\.json|\.env|config)"),
    },
    CategoryRule {
        name: "docs",
        weight: 5,
        keywords: &["document", "readme", "changelog", "docstring", "guide", "tutorial"],
        types: &["docs"],
        file_pattern: Some(r"(?i)(\.md\b|docs/|readme)"),
    },
    CategoryRule {
        name: "feature-dev",
        weight: 3,
        keywords: &["feature", "implement", "add", "support", "endpoint", "handler"],
        types: &["feature", "file-write", "code"],
        file_pattern: None,
    },
];

/// Compiled file-path patterns, index-aligned with [`RULES`]
static FILE_PATTERNS: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            rule.file_pattern
                .map(|p| Regex::new(p).expect("rule file pattern is valid"))
        })
        .collect()
});

// ============================================================================
// INPUT
// ============================================================================

/// Fields the categorizer looks at, borrowed from the (post-redaction)
/// observation input
#[derive(Debug, Clone, Copy, Default)]
pub struct CategorizeInput<'a> {
    pub obs_type: &'a str,
    pub title: &'a str,
    pub text: &'a str,
    pub narrative: &'a str,
    pub concepts: &'a str,
    pub files_read: &'a str,
    pub files_modified: &'a str,
}

// ============================================================================
// CATEGORIZATION
// ============================================================================

/// Derive the category tag for an observation
pub fn categorize(input: &CategorizeInput<'_>) -> &'static str {
    let haystack = format!(
        "{} {} {} {}",
        input.title, input.text, input.narrative, input.concepts
    )
    .to_lowercase();
    let files = format!("{},{}", input.files_modified, input.files_read);

    let mut best: Option<(&'static str, u32)> = None;

    for (idx, rule) in RULES.iter().enumerate() {
        let mut score = 0u32;

        for keyword in rule.keywords {
            if haystack.contains(keyword) {
                score += rule.weight;
            }
        }

        if rule.types.contains(&input.obs_type) {
            score += 2 * rule.weight;
        }

        if let Some(re) = &FILE_PATTERNS[idx] {
            score += rule.weight * re.find_iter(&files).count() as u32;
        }

        // Strictly-greater keeps the earlier (more specific) rule on ties
        if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((rule.name, score));
        }
    }

    best.map(|(name, _)| name).unwrap_or(FALLBACK_CATEGORY)
}

// ============================================================================
// TESTS
// ============================================================================
