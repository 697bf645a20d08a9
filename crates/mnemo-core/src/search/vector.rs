//! Exact Vector Search
//!
//! Cosine similarity over a bounded, recency-ordered candidate window.
//! At the target scale (≤100k observations) an exact scan over the most
//! recent `max_candidates` embedded rows beats maintaining an ANN index;
//! the window is the documented tradeoff: ancient records fall outside
//! it and are only reachable through keyword search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embeddings::{cosine_similarity, Embedding};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default number of hits returned
pub const DEFAULT_VECTOR_LIMIT: usize = 10;

/// Default minimum cosine similarity for a hit
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Default size of the recency-ordered candidate window
pub const DEFAULT_MAX_CANDIDATES: usize = 2000;

// ============================================================================
// OPTIONS & HITS
// ============================================================================

/// Options for a vector search
#[derive(Debug, Clone)]
pub struct VectorSearchOptions {
    /// Restrict candidates to one project
    pub project: Option<String>,
    /// Maximum hits returned
    pub limit: usize,
    /// Minimum cosine similarity
    pub threshold: f32,
    /// Candidate window size (bounds memory and CPU)
    pub max_candidates: usize,
}

impl Default for VectorSearchOptions {
    fn default() -> Self {
        Self {
            project: None,
            limit: DEFAULT_VECTOR_LIMIT,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// One vector search hit
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorHit {
    pub observation_id: i64,
    pub similarity: f32,
    pub title: String,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub obs_type: String,
    pub project: String,
    pub created_at: DateTime<Utc>,
    pub created_at_epoch: i64,
}

/// A candidate row loaded from the embedding table
#[derive(Debug, Clone)]
pub struct EmbeddedCandidate {
    pub observation_id: i64,
    pub title: String,
    pub text: Option<String>,
    pub obs_type: String,
    pub project: String,
    pub created_at: DateTime<Utc>,
    pub created_at_epoch: i64,
    pub embedding: Vec<u8>,
}

// ============================================================================
// RANKING
// ============================================================================

/// Score candidates against a query vector and keep the top hits
///
/// A stored blob of the wrong length (or one whose vector has zero
/// norm) scores 0 and falls below any positive threshold; malformed
/// rows never fail the search.
pub fn rank_candidates(
    query: &[f32],
    candidates: Vec<EmbeddedCandidate>,
    threshold: f32,
    limit: usize,
) -> Vec<VectorHit> {
    if limit == 0 || query.is_empty() {
        return vec![];
    }

    let mut hits: Vec<VectorHit> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let similarity = Embedding::from_bytes(&candidate.embedding)
                .map(|stored| cosine_similarity(query, &stored.vector))
                .unwrap_or(0.0);

            if similarity < threshold {
                return None;
            }

            Some(VectorHit {
                observation_id: candidate.observation_id,
                similarity,
                title: candidate.title,
                text: candidate.text,
                obs_type: candidate.obs_type,
                project: candidate.project,
                created_at: candidate.created_at,
                created_at_epoch: candidate.created_at_epoch,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.created_at_epoch.cmp(&a.created_at_epoch))
            .then(b.observation_id.cmp(&a.observation_id))
    });
    hits.truncate(limit);
    hits
}

// ============================================================================
// TESTS
// ============================================================================
