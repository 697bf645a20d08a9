//! Test Database Manager
//!
//! Isolated database instances for testing: each `TestDb` owns a
//! temporary directory that is deleted on drop, a `Storage` built with
//! the stub provider, and a raw connection for fixture surgery
//! (backdating rows past retention windows, for instance).

use std::path::PathBuf;
use std::sync::Arc;

use mnemo_core::{CreateOutcome, ObservationInput, Storage};
use tempfile::TempDir;

use crate::mocks::StubProvider;

/// An isolated store for one test
pub struct TestDb {
    /// The storage instance under test
    pub storage: Storage,
    /// Temporary directory (kept alive to prevent premature deletion)
    temp_dir: TempDir,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDb {
    /// Create a fresh temp-dir database with the stub embedding provider
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_mnemo.db");

        let storage = Storage::with_provider(Some(db_path.clone()), Arc::new(StubProvider))
            .expect("Failed to create test storage");

        Self {
            storage,
            temp_dir,
            db_path,
        }
    }

    /// Path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Directory for scratch files the test wants the store to stat
    pub fn dir(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    /// Raw connection for fixture surgery outside the public API
    pub fn raw(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.db_path).expect("Failed to open raw connection")
    }

    /// Create an observation, panicking on the duplicate sentinel
    pub fn create(&self, input: ObservationInput) -> i64 {
        match self.storage.create_observation(input).expect("create failed") {
            CreateOutcome::Created(id) => id,
            CreateOutcome::Duplicate => panic!("unexpected duplicate suppression"),
        }
    }

    /// Rewrite an observation's creation epoch (ms), e.g. to age it
    /// past a retention window
    pub fn backdate(&self, id: i64, epoch_ms: i64) {
        self.raw()
            .execute(
                "UPDATE observations SET created_at_epoch = ?1 WHERE id = ?2",
                rusqlite::params![epoch_ms, id],
            )
            .expect("backdate failed");
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}
