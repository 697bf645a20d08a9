//! Smart Context Assembly
//!
//! Builds a token-budgeted context payload for priming a new session:
//! recent summaries first, then knowledge observations, then the rest,
//! each class ordered by recency. Items that would push past the budget
//! are skipped while smaller later items still get a chance, so the
//! budget fills instead of cutting off at the first oversized entry.

use serde::{Deserialize, Serialize};

use crate::memory::Summary;
use crate::storage::{Result, Storage};

// ============================================================================
// CONSTANTS & TYPES
// ============================================================================

/// How many recent observations assembly considers
const CANDIDATE_WINDOW: usize = 200;

/// How many recent summaries are offered
const SUMMARY_WINDOW: usize = 3;

/// Estimated token cost of a text: `ceil(len / 4)`
pub fn estimated_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// One observation admitted into the context payload
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub obs_type: String,
    pub title: String,
    pub text: Option<String>,
    pub created_at_epoch: i64,
    /// Estimated token cost charged against the budget
    pub tokens: usize,
}

/// The assembled session-priming payload
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartContext {
    pub project: String,
    pub items: Vec<ContextItem>,
    pub summaries: Vec<Summary>,
    pub token_budget: usize,
    pub tokens_used: usize,
}

fn summary_cost(summary: &Summary) -> usize {
    let joined = [
        summary.request.as_deref(),
        summary.investigated.as_deref(),
        summary.learned.as_deref(),
        summary.completed.as_deref(),
        summary.next_steps.as_deref(),
        summary.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n");
    estimated_tokens(&joined).max(1)
}

// ============================================================================
// ASSEMBLY
// ============================================================================

impl Storage {
    /// Assemble a prioritized, token-budgeted context for a project
    pub fn get_smart_context(&self, project: &str, token_budget: usize) -> Result<SmartContext> {
        let mut tokens_used = 0usize;

        // Summaries lead: a session recap primes better than any single
        // observation
        let mut summaries = Vec::new();
        for summary in self.get_recent_summaries(Some(project), SUMMARY_WINDOW)? {
            let cost = summary_cost(&summary);
            if tokens_used + cost > token_budget {
                continue;
            }
            tokens_used += cost;
            summaries.push(summary);
        }

        // Knowledge before everything else; recency within each class.
        // The timeline is already newest-first, so a stable partition
        // preserves recency order inside both halves.
        let candidates = self.get_timeline(Some(project), CANDIDATE_WINDOW, None)?;
        let (knowledge, rest): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|o| o.is_knowledge());

        let mut items = Vec::new();
        for observation in knowledge.into_iter().chain(rest) {
            let body = match observation.text.as_deref() {
                Some(text) => format!("{}\n{}", observation.title, text),
                None => observation.title.clone(),
            };
            let cost = estimated_tokens(&body).max(1);
            if tokens_used + cost > token_budget {
                continue;
            }
            tokens_used += cost;
            items.push(ContextItem {
                id: observation.id,
                obs_type: observation.obs_type,
                title: observation.title,
                text: observation.text,
                created_at_epoch: observation.created_at_epoch,
                tokens: cost,
            });
        }

        Ok(SmartContext {
            project: project.to_string(),
            items,
            summaries,
            token_budget,
            tokens_used,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
