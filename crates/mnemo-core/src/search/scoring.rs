//! Deterministic Scoring
//!
//! Four signals in `[0, 1]` blended linearly, then multiplicative
//! boosts, then a clip to 1.0. The constants here are the public
//! ranking contract: a consumer that reproduces them reproduces the
//! ordering bit-for-bit on the same database snapshot.
//!
//! Signals:
//! - `semantic` — cosine similarity from vector search (negatives clamp to 0)
//! - `fts` — min-max normalization of inverted BM25 ranks within the result set
//! - `recency` — exponential decay, half-life 168 h
//! - `project_match` — 1 when the item's project equals the target

use crate::memory::knowledge_boost;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Half-life of the creation-recency signal, in hours
pub const RECENCY_HALF_LIFE_HOURS: f64 = 168.0;

/// Half-life of the access-recency helper, in hours
pub const ACCESS_HALF_LIFE_HOURS: f64 = 48.0;

/// Multiplier applied when an item has both a semantic and an FTS hit
pub const HYBRID_BOOST: f64 = 1.15;

/// Score multiplier for stale observations
pub const STALE_PENALTY: f64 = 0.5;

// ============================================================================
// WEIGHTS
// ============================================================================

/// Linear blend weights over the four signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub fts: f64,
    pub recency: f64,
    pub project_match: f64,
}

impl ScoreWeights {
    /// Preset for user-facing search
    pub const SEARCH: ScoreWeights = ScoreWeights {
        semantic: 0.4,
        fts: 0.3,
        recency: 0.2,
        project_match: 0.1,
    };

    /// Preset for session-priming context assembly
    pub const CONTEXT: ScoreWeights = ScoreWeights {
        semantic: 0.0,
        fts: 0.0,
        recency: 0.7,
        project_match: 0.3,
    };
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::SEARCH
    }
}

// ============================================================================
// SIGNALS
// ============================================================================

/// The per-item signal values, each already in `[0, 1]`
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals {
    pub semantic: f64,
    pub fts: f64,
    pub recency: f64,
    pub project_match: f64,
}

/// Exponential decay: 1.0 at age 0, 0.5 at one half-life
///
/// Future timestamps (negative age) clamp to 1.0.
pub fn decay_score(age_ms: i64, half_life_hours: f64) -> f64 {
    if age_ms <= 0 || half_life_hours <= 0.0 {
        return 1.0;
    }
    let age_hours = age_ms as f64 / 3_600_000.0;
    (-std::f64::consts::LN_2 * age_hours / half_life_hours).exp()
}

/// Creation-recency signal for an observation
pub fn recency_score(created_at_epoch: i64, now_ms: i64) -> f64 {
    decay_score(now_ms - created_at_epoch, RECENCY_HALF_LIFE_HOURS)
}

/// Access-recency helper (48 h half-life); never-accessed scores 0
pub fn access_recency(last_accessed_epoch: Option<i64>, now_ms: i64) -> f64 {
    match last_accessed_epoch {
        Some(epoch) => decay_score(now_ms - epoch, ACCESS_HALF_LIFE_HOURS),
        None => 0.0,
    }
}

/// Multiplier for stale items, available to assembly-style callers
pub fn staleness_penalty(is_stale: bool) -> f64 {
    if is_stale {
        STALE_PENALTY
    } else {
        1.0
    }
}

/// Project-match signal; no target means 0 for everything
pub fn project_match_signal(target: Option<&str>, project: &str) -> f64 {
    match target {
        Some(t) if t.eq_ignore_ascii_case(project) => 1.0,
        _ => 0.0,
    }
}

/// Bounds of the raw BM25 rank set, if any ranks exist
pub fn rank_bounds(ranks: &[f64]) -> Option<(f64, f64)> {
    let mut iter = ranks.iter().copied();
    let first = iter.next()?;
    let mut min = first;
    let mut max = first;
    for r in iter {
        min = min.min(r);
        max = max.max(r);
    }
    Some((min, max))
}

/// FTS signal for one item: inverted min-max over the result set
///
/// BM25 ranks are "lower is better"; `(max − r) / (max − min)` maps the
/// best rank to 1 and the worst to 0. With no hit the signal is 0; when
/// every hit shares one rank, every hit scores 1.
pub fn fts_signal(rank: Option<f64>, bounds: Option<(f64, f64)>) -> f64 {
    let (Some(rank), Some((min, max))) = (rank, bounds) else {
        return 0.0;
    };
    if (max - min).abs() < f64::EPSILON {
        return 1.0;
    }
    ((max - rank) / (max - min)).clamp(0.0, 1.0)
}

// ============================================================================
// COMPOSITE
// ============================================================================

/// Linear blend of the four signals
pub fn blend(signals: &Signals, weights: &ScoreWeights) -> f64 {
    weights.semantic * signals.semantic.clamp(0.0, 1.0)
        + weights.fts * signals.fts
        + weights.recency * signals.recency
        + weights.project_match * signals.project_match
}

/// Apply the hybrid and knowledge-type boosts and clip to 1.0
pub fn apply_boosts(base: f64, has_semantic: bool, has_fts: bool, obs_type: &str) -> f64 {
    let mut score = base;
    if has_semantic && has_fts {
        score *= HYBRID_BOOST;
    }
    score *= knowledge_boost(obs_type);
    score.min(1.0)
}

// ============================================================================
// TESTS
// ============================================================================
