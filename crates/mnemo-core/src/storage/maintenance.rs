//! Staleness Detection & Consolidation
//!
//! Two maintenance passes over a project:
//! - Staleness: an observation whose referenced files changed on disk
//!   after it was written no longer describes reality; it gets flagged
//!   so ranking and assembly can discount it.
//! - Consolidation: repeated observations over the same `(type, files)`
//!   pair collapse into one keeper row carrying the union of texts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::UNIX_EPOCH;

use super::sqlite::{Result, Storage, MAX_BULK_IDS};
use crate::embeddings::truncate_chars;
use crate::memory::MAX_TITLE_BYTES;
use rusqlite::{params, params_from_iter, types::Value};

// ============================================================================
// CONSTANTS & TYPES
// ============================================================================

/// How many recent observations one staleness pass inspects
pub const STALE_SCAN_LIMIT: usize = 500;

/// Separator between merged texts in a consolidated observation
pub const CONSOLIDATED_SEPARATOR: &str = "\n---\n";

/// Character cap on a consolidated text body
pub const CONSOLIDATED_TEXT_MAX_CHARS: usize = 100_000;

/// Options for a consolidation pass
#[derive(Debug, Clone)]
pub struct ConsolidateOptions {
    /// Minimum group size considered for merging
    pub min_group_size: usize,
    /// Compute counts without writing
    pub dry_run: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            min_group_size: 3,
            dry_run: false,
        }
    }
}

/// Result of a consolidation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationOutcome {
    /// Groups merged into a keeper
    pub merged: u64,
    /// Observations deleted (group members minus keepers)
    pub removed: u64,
}

#[derive(Debug)]
struct GroupMember {
    id: i64,
    title: String,
    text: Option<String>,
    created_at_epoch: i64,
}

// ============================================================================
// STORAGE METHODS
// ============================================================================

impl Storage {
    /// Detect and flag stale observations for a project
    ///
    /// Scans the [`STALE_SCAN_LIMIT`] most recent observations that
    /// reference modified files, compares each file's mtime against the
    /// observation's creation epoch, marks the hits, and returns their
    /// ids. Missing or unreadable paths are skipped, never an error.
    pub fn detect_stale(&self, project: &str) -> Result<Vec<i64>> {
        let rows: Vec<(i64, i64, String)> = {
            let reader = self.reader_lock()?;
            let mut stmt = reader.prepare(
                "SELECT id, created_at_epoch, files_modified FROM observations
                 WHERE project = ?1
                   AND files_modified IS NOT NULL AND files_modified != ''
                 ORDER BY created_at_epoch DESC, id DESC
                 LIMIT ?2",
            )?;
            stmt.query_map(params![project, STALE_SCAN_LIMIT as i64], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut stale_ids = Vec::new();
        for (id, created_at_epoch, files_modified) in rows {
            let changed = files_modified
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .any(|path| file_mtime_ms(path).is_some_and(|mtime| mtime > created_at_epoch));
            if changed {
                stale_ids.push(id);
            }
        }

        if !stale_ids.is_empty() {
            self.mark_stale(&stale_ids, true)?;
        }
        Ok(stale_ids)
    }

    /// Observations currently flagged stale for a project
    pub fn get_stale_observations(
        &self,
        project: &str,
        limit: usize,
    ) -> Result<Vec<crate::memory::Observation>> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let reader = self.reader_lock()?;
        let mut stmt = reader.prepare(
            "SELECT * FROM observations
             WHERE project = ?1 AND is_stale = 1
             ORDER BY created_at_epoch DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project, limit as i64], Self::row_to_observation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Bulk set or clear the stale flag
    ///
    /// Ids are filtered to positive values and capped at [`MAX_BULK_IDS`].
    pub fn mark_stale(&self, ids: &[i64], value: bool) -> Result<usize> {
        let ids: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| *id > 0)
            .take(MAX_BULK_IDS)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("UPDATE observations SET is_stale = ? WHERE id IN ({placeholders})");

        let mut values: Vec<Value> = vec![Value::from(i64::from(value))];
        values.extend(ids.iter().map(|id| Value::from(*id)));

        let writer = self.writer_lock()?;
        let changed = writer.execute(&sql, params_from_iter(values))?;
        Ok(changed)
    }

    /// Merge duplicate observations grouped by `(type, files_modified)`
    ///
    /// Groups are keyed on raw string equality of `files_modified`; two
    /// orderings of the same file list do not merge. Within a group the
    /// newest member survives, its text becomes the separator-joined
    /// union of the distinct texts (keeper first, capped at
    /// [`CONSOLIDATED_TEXT_MAX_CHARS`]), its title gains the
    /// `[consolidated xN]` prefix, and the rest are deleted together
    /// with their embeddings in one transaction.
    pub fn consolidate_observations(
        &self,
        project: &str,
        opts: &ConsolidateOptions,
    ) -> Result<ConsolidationOutcome> {
        let rows: Vec<(i64, String, String, Option<String>, String, i64)> = {
            let reader = self.reader_lock()?;
            let mut stmt = reader.prepare(
                "SELECT id, type, files_modified, text, title, created_at_epoch
                 FROM observations
                 WHERE project = ?1
                   AND files_modified IS NOT NULL AND files_modified != ''",
            )?;
            stmt.query_map(params![project], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut groups: HashMap<(String, String), Vec<GroupMember>> = HashMap::new();
        for (id, obs_type, files_modified, text, title, created_at_epoch) in rows {
            groups
                .entry((obs_type, files_modified))
                .or_default()
                .push(GroupMember {
                    id,
                    title,
                    text,
                    created_at_epoch,
                });
        }

        let min_group_size = opts.min_group_size.max(2);
        let mut mergeable: Vec<Vec<GroupMember>> = groups
            .into_values()
            .filter(|members| members.len() >= min_group_size)
            .collect();
        for members in &mut mergeable {
            members.sort_by(|a, b| {
                b.created_at_epoch
                    .cmp(&a.created_at_epoch)
                    .then(b.id.cmp(&a.id))
            });
        }
        // Deterministic apply order across runs
        mergeable.sort_by_key(|members| members[0].id);

        let mut outcome = ConsolidationOutcome::default();
        for members in &mergeable {
            outcome.merged += 1;
            outcome.removed += (members.len() - 1) as u64;
        }

        if opts.dry_run || mergeable.is_empty() {
            return Ok(outcome);
        }

        let writer = self.writer_lock()?;
        let tx = writer.unchecked_transaction()?;

        for members in mergeable {
            let keeper = &members[0];

            // Union of distinct texts, keeper first
            let mut seen = std::collections::HashSet::new();
            let mut texts: Vec<&str> = Vec::new();
            for member in &members {
                if let Some(text) = member.text.as_deref() {
                    if !text.is_empty() && seen.insert(text) {
                        texts.push(text);
                    }
                }
            }
            let joined = texts.join(CONSOLIDATED_SEPARATOR);
            let merged_text = truncate_chars(&joined, CONSOLIDATED_TEXT_MAX_CHARS);

            let title = format!("[consolidated x{}] {}", members.len(), keeper.title);
            let title = truncate_chars(&title, MAX_TITLE_BYTES);

            tx.execute(
                "UPDATE observations SET title = ?1, text = ?2 WHERE id = ?3",
                params![title, merged_text, keeper.id],
            )?;

            let loser_ids: Vec<i64> = members[1..].iter().map(|m| m.id).collect();
            let placeholders = vec!["?"; loser_ids.len()].join(", ");
            let id_values: Vec<Value> = loser_ids.iter().map(|id| Value::from(*id)).collect();

            tx.execute(
                &format!(
                    "DELETE FROM observation_embeddings WHERE observation_id IN ({placeholders})"
                ),
                params_from_iter(id_values.clone()),
            )?;
            tx.execute(
                &format!("DELETE FROM observations WHERE id IN ({placeholders})"),
                params_from_iter(id_values),
            )?;
        }

        tx.commit()?;
        Ok(outcome)
    }
}

/// Modification time of a path in ms since the Unix epoch, if readable
fn file_mtime_ms(path: &str) -> Option<i64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let duration = modified.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(duration.as_millis()).ok()
}

// ============================================================================
// TESTS
// ============================================================================
