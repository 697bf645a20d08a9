//! Storage Module
//!
//! SQLite-based storage layer with:
//! - FTS5 full-text search with query sanitization (LIKE fallback)
//! - Embedded vector storage with exact cosine search
//! - Staleness detection and duplicate consolidation
//! - Age-based retention with knowledge exemptions

mod maintenance;
mod migrations;
mod retention;
mod sqlite;

pub use maintenance::{
    ConsolidateOptions, ConsolidationOutcome, CONSOLIDATED_SEPARATOR, CONSOLIDATED_TEXT_MAX_CHARS,
    STALE_SCAN_LIMIT,
};
pub use migrations::MIGRATIONS;
pub use retention::{RetentionConfig, RetentionOutcome};
pub use sqlite::{Result, Storage, StorageError, MAX_BULK_IDS};
