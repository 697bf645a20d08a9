//! Database Migrations
//!
//! Schema migration definitions for the storage layer. The full-text
//! index is created separately by [`ensure_fts`] so that a SQLite build
//! without the FTS5 module still yields a working store (keyword search
//! degrades to LIKE).

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: observations, embeddings, session records",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Staleness tracking and project aliases",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project TEXT NOT NULL,
    memory_session_id TEXT,
    prompt_number INTEGER,
    type TEXT NOT NULL,
    auto_category TEXT,
    title TEXT NOT NULL,
    subtitle TEXT,
    text TEXT,
    narrative TEXT,
    facts TEXT,
    concepts TEXT,
    files_read TEXT,
    files_modified TEXT,
    created_at TEXT NOT NULL,
    created_at_epoch INTEGER NOT NULL,
    content_hash TEXT,
    discovery_tokens INTEGER NOT NULL DEFAULT 0,
    last_accessed_epoch INTEGER
);

CREATE INDEX IF NOT EXISTS idx_observations_project_created
    ON observations(project, created_at_epoch DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_observations_content_hash ON observations(content_hash);
CREATE INDEX IF NOT EXISTS idx_observations_type ON observations(type);

-- Embeddings storage table (binary blob for efficiency)
CREATE TABLE IF NOT EXISTS observation_embeddings (
    observation_id INTEGER PRIMARY KEY REFERENCES observations(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    model TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Per-session recaps, deduped on (session, project, epoch)
CREATE TABLE IF NOT EXISTS summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    project TEXT NOT NULL,
    request TEXT,
    investigated TEXT,
    learned TEXT,
    completed TEXT,
    next_steps TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    created_at_epoch INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_summaries_dedup
    ON summaries(session_id, project, created_at_epoch);
CREATE INDEX IF NOT EXISTS idx_summaries_project_created
    ON summaries(project, created_at_epoch DESC);

-- Per-session prompt log, one row per prompt number
CREATE TABLE IF NOT EXISTS prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_session_id TEXT NOT NULL,
    project TEXT NOT NULL,
    prompt_number INTEGER NOT NULL,
    prompt_text TEXT NOT NULL,
    created_at_epoch INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_prompts_session_number
    ON prompts(content_session_id, prompt_number);

-- Session lifecycle tracking
CREATE TABLE IF NOT EXISTS sessions (
    content_session_id TEXT PRIMARY KEY,
    project TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    started_at_epoch INTEGER NOT NULL,
    completed_at_epoch INTEGER
);

CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project);

-- Point-in-time session snapshots
CREATE TABLE IF NOT EXISTS checkpoints (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    project TEXT NOT NULL,
    task TEXT,
    progress TEXT,
    next_steps TEXT,
    open_questions TEXT,
    relevant_files TEXT,
    context_snapshot TEXT,
    created_at_epoch INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_checkpoints_session
    ON checkpoints(session_id, created_at_epoch DESC);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Staleness tracking and project aliases
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE observations ADD COLUMN is_stale INTEGER NOT NULL DEFAULT 0;

CREATE INDEX IF NOT EXISTS idx_observations_stale ON observations(is_stale);

CREATE TABLE IF NOT EXISTS project_aliases (
    project_name TEXT PRIMARY KEY,
    display_name TEXT NOT NULL
);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// FTS5 index over the observation text columns
///
/// External-content table with sync triggers; column order fixes the
/// BM25 weight order (title, text, narrative, concepts).
const FTS_SCHEMA: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS observations_fts USING fts5(
    title, text, narrative, concepts,
    content='observations',
    content_rowid='id',
    tokenize='porter ascii'
);

CREATE TRIGGER IF NOT EXISTS observations_ai AFTER INSERT ON observations BEGIN
    INSERT INTO observations_fts(rowid, title, text, narrative, concepts)
    VALUES (NEW.id, NEW.title, NEW.text, NEW.narrative, NEW.concepts);
END;

CREATE TRIGGER IF NOT EXISTS observations_ad AFTER DELETE ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, text, narrative, concepts)
    VALUES ('delete', OLD.id, OLD.title, OLD.text, OLD.narrative, OLD.concepts);
END;

CREATE TRIGGER IF NOT EXISTS observations_au AFTER UPDATE ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, text, narrative, concepts)
    VALUES ('delete', OLD.id, OLD.title, OLD.text, OLD.narrative, OLD.concepts);
    INSERT INTO observations_fts(rowid, title, text, narrative, concepts)
    VALUES (NEW.id, NEW.title, NEW.text, NEW.narrative, NEW.concepts);
END;
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            // Use execute_batch to handle multi-statement SQL including triggers
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}

/// Create the FTS5 table and sync triggers if the module is present
///
/// Returns `false` (and logs) when the SQLite build has no FTS5; the
/// store stays usable and keyword search falls back to LIKE. A freshly
/// created index is rebuilt from the base table, which covers a store
/// previously opened by a build without FTS5.
pub fn ensure_fts(conn: &rusqlite::Connection) -> bool {
    let existed = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'observations_fts'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n > 0)
        .unwrap_or(false);

    match conn.execute_batch(FTS_SCHEMA) {
        Ok(()) => {
            if !existed {
                if let Err(e) = conn.execute_batch(
                    "INSERT INTO observations_fts(observations_fts) VALUES('rebuild');",
                ) {
                    tracing::warn!("FTS rebuild failed: {}", e);
                }
            }
            true
        }
        Err(e) => {
            tracing::warn!("FTS5 index unavailable, keyword search will use LIKE: {}", e);
            false
        }
    }
}
