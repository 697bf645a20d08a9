//! Hybrid Search Ranking
//!
//! Merges the vector and keyword result sets by observation id, scores
//! every candidate with the deterministic blend, and produces a total
//! order: score descending, then creation recency, then id. The merge
//! itself is pure; the storage layer owns the fan-out and the
//! best-effort access-time update.

use serde::{Deserialize, Serialize};

use crate::memory::Observation;
use crate::search::scoring::{
    apply_boosts, blend, fts_signal, project_match_signal, rank_bounds, recency_score,
    ScoreWeights, Signals,
};

// ============================================================================
// OPTIONS & RESULTS
// ============================================================================

/// Default number of hybrid results returned
pub const DEFAULT_HYBRID_LIMIT: usize = 10;

/// Options for a hybrid search
#[derive(Debug, Clone)]
pub struct HybridSearchOptions {
    /// Restrict and project-match against this project
    pub project: Option<String>,
    /// Maximum results returned
    pub limit: usize,
    /// Blend weights (defaults to the user-search preset)
    pub weights: ScoreWeights,
}

impl Default for HybridSearchOptions {
    fn default() -> Self {
        Self {
            project: None,
            limit: DEFAULT_HYBRID_LIMIT,
            weights: ScoreWeights::SEARCH,
        }
    }
}

/// Which retrieval leg produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Both the vector and keyword legs hit
    Hybrid,
    /// Vector leg only
    Vector,
    /// Keyword leg only
    Keyword,
}

/// One ranked hybrid search result
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub observation: Observation,
    /// Cosine similarity from the vector leg (0 when it did not hit)
    pub semantic_score: f64,
    /// Raw BM25 rank from the keyword leg, lower is better
    pub fts_rank: Option<f64>,
    /// Creation-recency signal used in the blend
    pub recency: f64,
    /// Project-match signal used in the blend
    pub project_match: f64,
    /// Final boosted score in `[0, 1]`
    pub score: f64,
    pub source: SearchSource,
}

/// A merged candidate before scoring
#[derive(Debug, Clone)]
pub struct MergedCandidate {
    pub observation: Observation,
    /// Semantic similarity, 0.0 when only the keyword leg hit
    pub semantic: f64,
    /// Raw BM25 rank when the keyword leg hit
    pub fts_rank: Option<f64>,
}

// ============================================================================
// RANKING
// ============================================================================

/// Score and order merged candidates
///
/// Deterministic for a fixed candidate set and `now_ms`: equal scores
/// break by creation epoch descending, then id descending.
pub fn rank_merged(
    candidates: Vec<MergedCandidate>,
    opts: &HybridSearchOptions,
    now_ms: i64,
) -> Vec<SearchResult> {
    if opts.limit == 0 || candidates.is_empty() {
        return vec![];
    }

    let ranks: Vec<f64> = candidates.iter().filter_map(|c| c.fts_rank).collect();
    let bounds = rank_bounds(&ranks);

    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|candidate| {
            let has_semantic = candidate.semantic > 0.0;
            let has_fts = candidate.fts_rank.is_some();

            let signals = Signals {
                semantic: candidate.semantic.max(0.0),
                fts: fts_signal(candidate.fts_rank, bounds),
                recency: recency_score(candidate.observation.created_at_epoch, now_ms),
                project_match: project_match_signal(
                    opts.project.as_deref(),
                    &candidate.observation.project,
                ),
            };

            let score = apply_boosts(
                blend(&signals, &opts.weights),
                has_semantic,
                has_fts,
                &candidate.observation.obs_type,
            );

            let source = match (has_semantic, has_fts) {
                (true, true) => SearchSource::Hybrid,
                (true, false) => SearchSource::Vector,
                _ => SearchSource::Keyword,
            };

            SearchResult {
                observation: candidate.observation,
                semantic_score: candidate.semantic.max(0.0),
                fts_rank: candidate.fts_rank,
                recency: signals.recency,
                project_match: signals.project_match,
                score,
                source,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.observation
                    .created_at_epoch
                    .cmp(&a.observation.created_at_epoch),
            )
            .then(b.observation.id.cmp(&a.observation.id))
    });
    results.truncate(opts.limit);
    results
}

// ============================================================================
// TESTS
// ============================================================================
