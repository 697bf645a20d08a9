//! Shared test support
//!
//! A deterministic stub embedding provider and storage constructors
//! used across the unit test modules. Compiled only for tests.

use std::sync::Arc;

use tempfile::TempDir;

use crate::embeddings::{Embedding, EmbeddingProvider, ProviderStatus};
use crate::memory::ObservationInput;
use crate::storage::Storage;

/// Deterministic embedding provider: hashes words into a small vector
/// so related texts land near each other without any model
pub(crate) struct StubProvider;

impl EmbeddingProvider for StubProvider {
    fn initialize(&self) -> ProviderStatus {
        ProviderStatus::Available
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let mut vector = vec![0.0_f32; 8];
        for word in text.to_lowercase().split_whitespace() {
            let mut hash: u64 = 1469598103934665603;
            for b in word.bytes() {
                hash ^= b as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % 8) as usize] += 1.0;
        }
        let mut embedding = Embedding::new(vector);
        embedding.normalize();
        Some(embedding.vector)
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model_name(&self) -> &'static str {
        "stub-v1"
    }
}

/// Fresh temp-dir storage backed by the stub provider
pub(crate) fn test_storage() -> (Storage, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let storage = Storage::with_provider(Some(dir.path().join("test.db")), Arc::new(StubProvider))
        .expect("storage");
    (storage, dir)
}

/// Observation input builder with test defaults
pub(crate) fn obs(project: &str, obs_type: &str, title: &str) -> ObservationInput {
    ObservationInput {
        project: project.to_string(),
        obs_type: obs_type.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}
