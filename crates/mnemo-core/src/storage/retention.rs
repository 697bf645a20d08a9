//! Retention Policies
//!
//! Age-based deletion with per-class windows. Knowledge observations
//! get their own (longer) window plus an importance exemption read from
//! the `facts` payload. Counts are taken by SELECT COUNT(*) immediately
//! before each DELETE inside the transaction: trigger cascades on the
//! full-text index make "rows affected" unreliable for this purpose.

use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, types::Value, Connection};
use serde::{Deserialize, Serialize};

use super::sqlite::{Result, Storage};
use crate::memory::KNOWLEDGE_TYPES;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Per-class retention windows in days; a value ≤ 0 disables deletion
/// for that class
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetentionConfig {
    /// Non-knowledge observations
    pub obs_days: i64,
    /// Session summaries
    pub summary_days: i64,
    /// Prompt records
    pub prompt_days: i64,
    /// Knowledge observations (importance 4–5 exempt)
    pub knowledge_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            obs_days: 30,
            summary_days: 90,
            prompt_days: 30,
            knowledge_days: 365,
        }
    }
}

/// Per-class deletion counts
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionOutcome {
    pub observations: u64,
    pub summaries: u64,
    pub prompts: u64,
    pub knowledge: u64,
    pub total: u64,
    pub executed_at: DateTime<Utc>,
}

const MS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// IMPORTANCE EXEMPTION
// ============================================================================

/// Whether a `facts` payload marks its observation as exempt
///
/// Parses the payload as JSON first; the canonical substring forms are
/// the compatibility floor for payloads that are not valid JSON.
fn is_importance_exempt(facts: Option<&str>) -> bool {
    let Some(facts) = facts else {
        return false;
    };
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(facts) {
        if let Some(importance) = value.get("importance").and_then(|v| v.as_i64()) {
            return importance == 4 || importance == 5;
        }
    }
    [
        "\"importance\":4",
        "\"importance\": 4",
        "\"importance\":5",
        "\"importance\": 5",
    ]
    .iter()
    .any(|needle| facts.contains(needle))
}

// ============================================================================
// STORAGE METHODS
// ============================================================================

impl Storage {
    /// Dry-run: what [`Storage::apply_retention`] would delete
    pub fn retention_stats(&self, cfg: &RetentionConfig) -> Result<RetentionOutcome> {
        let reader = self.reader_lock()?;
        let outcome = run_retention(&reader, cfg, false)?;
        Ok(outcome)
    }

    /// Delete expired rows per the config, atomically
    ///
    /// Embeddings are removed before their observations; a failure rolls
    /// the whole pass back and no partial counts leak out.
    pub fn apply_retention(&self, cfg: &RetentionConfig) -> Result<RetentionOutcome> {
        let writer = self.writer_lock()?;
        let tx = writer.unchecked_transaction()?;
        let outcome = run_retention(&tx, cfg, true)?;
        tx.commit()?;
        tracing::info!(
            "Retention removed {} rows ({} obs, {} summaries, {} prompts, {} knowledge)",
            outcome.total,
            outcome.observations,
            outcome.summaries,
            outcome.prompts,
            outcome.knowledge
        );
        Ok(outcome)
    }
}

fn run_retention(conn: &Connection, cfg: &RetentionConfig, apply: bool) -> Result<RetentionOutcome> {
    let now = Utc::now();
    let now_ms = now.timestamp_millis();

    let knowledge_placeholders = vec!["?"; KNOWLEDGE_TYPES.len()].join(", ");
    let knowledge_values = || KNOWLEDGE_TYPES.iter().map(|t| Value::from(t.to_string()));

    // Non-knowledge observations
    let observations = if cfg.obs_days > 0 {
        let cutoff = now_ms - cfg.obs_days * MS_PER_DAY;
        let where_clause = format!(
            "type NOT IN ({knowledge_placeholders}) AND created_at_epoch < ?"
        );
        let values: Vec<Value> = knowledge_values().chain([Value::from(cutoff)]).collect();

        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM observations WHERE {where_clause}"),
            params_from_iter(values.clone()),
            |row| row.get(0),
        )?;
        if apply && count > 0 {
            conn.execute(
                &format!(
                    "DELETE FROM observation_embeddings WHERE observation_id IN
                     (SELECT id FROM observations WHERE {where_clause})"
                ),
                params_from_iter(values.clone()),
            )?;
            conn.execute(
                &format!("DELETE FROM observations WHERE {where_clause}"),
                params_from_iter(values),
            )?;
        }
        count as u64
    } else {
        0
    };

    // Summaries
    let summaries = if cfg.summary_days > 0 {
        let cutoff = now_ms - cfg.summary_days * MS_PER_DAY;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM summaries WHERE created_at_epoch < ?1",
            [cutoff],
            |row| row.get(0),
        )?;
        if apply && count > 0 {
            conn.execute("DELETE FROM summaries WHERE created_at_epoch < ?1", [cutoff])?;
        }
        count as u64
    } else {
        0
    };

    // Prompts
    let prompts = if cfg.prompt_days > 0 {
        let cutoff = now_ms - cfg.prompt_days * MS_PER_DAY;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM prompts WHERE created_at_epoch < ?1",
            [cutoff],
            |row| row.get(0),
        )?;
        if apply && count > 0 {
            conn.execute("DELETE FROM prompts WHERE created_at_epoch < ?1", [cutoff])?;
        }
        count as u64
    } else {
        0
    };

    // Knowledge observations, minus the importance exemption
    let knowledge = if cfg.knowledge_days > 0 {
        let cutoff = now_ms - cfg.knowledge_days * MS_PER_DAY;
        let values: Vec<Value> = knowledge_values().chain([Value::from(cutoff)]).collect();

        let mut stmt = conn.prepare(&format!(
            "SELECT id, facts FROM observations
             WHERE type IN ({knowledge_placeholders}) AND created_at_epoch < ?"
        ))?;
        let candidates = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        let doomed: Vec<i64> = candidates
            .into_iter()
            .filter(|(_, facts)| !is_importance_exempt(facts.as_deref()))
            .map(|(id, _)| id)
            .collect();

        if apply && !doomed.is_empty() {
            for chunk in doomed.chunks(500) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let id_values: Vec<Value> = chunk.iter().map(|id| Value::from(*id)).collect();
                conn.execute(
                    &format!(
                        "DELETE FROM observation_embeddings WHERE observation_id IN ({placeholders})"
                    ),
                    params_from_iter(id_values.clone()),
                )?;
                conn.execute(
                    &format!("DELETE FROM observations WHERE id IN ({placeholders})"),
                    params_from_iter(id_values),
                )?;
            }
        }
        doomed.len() as u64
    } else {
        0
    };

    Ok(RetentionOutcome {
        observations,
        summaries,
        prompts,
        knowledge,
        total: observations + summaries + prompts + knowledge,
        executed_at: now,
    })
}

// ============================================================================
// TESTS
// ============================================================================
