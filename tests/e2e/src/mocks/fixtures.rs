//! Test Data Factory
//!
//! Deterministic embedding provider and input builders. The stub
//! hashes words into a small fixed vector so that texts sharing words
//! land near each other in cosine space, which is enough to exercise
//! every semantic code path without a model.

use mnemo_core::{Embedding, EmbeddingProvider, ObservationInput, ProviderStatus};

/// Deterministic word-bucket embedding provider
pub struct StubProvider;

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

/// Observation input builder with sensible test defaults
pub fn observation(project: &str, obs_type: &str, title: &str) -> ObservationInput {
    ObservationInput {
        project: project.to_string(),
        obs_type: obs_type.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}
