//! Embedding Provider Contract
//!
//! The engine talks to embedding backends through this trait. Backends
//! are capability-looked-up: [`discover`] returns the first viable
//! implementation, and absence is modeled as a provider that reports
//! [`ProviderStatus::Unavailable`] rather than as a missing value.

use std::sync::Arc;

// ============================================================================
// STATUS
// ============================================================================

/// Outcome of provider initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    /// The model is loaded and `embed` will produce vectors
    Available,
    /// No model could be loaded; every `embed` returns `None`
    Unavailable,
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// A source of fixed-dimension unit-norm vectors
///
/// Contract:
/// - `initialize` is idempotent and safe under concurrent first callers;
///   one caller performs the load, the rest await its outcome.
/// - `embed` truncates its input to 2000 characters and returns `None`
///   on any failure; it never panics on odd input.
/// - `embed_batch` preserves input order; a per-item failure yields a
///   `None` at that index without aborting the batch.
/// - After an `Unavailable` initialization every `embed` returns `None`.
pub trait EmbeddingProvider: Send + Sync {
    /// Load the model (idempotent); report whether vectors can be produced
    fn initialize(&self) -> ProviderStatus;

    /// Produce a vector for one text, or `None` on failure
    fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Produce vectors for many texts, order-preserving with per-item `None`
    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Vec<f32>>>;

    /// The fixed model dimension
    fn dimensions(&self) -> usize;

    /// Identity stored alongside each vector; a mismatch with a stored
    /// `model` column schedules re-embedding rather than invalidating
    fn model_name(&self) -> &'static str;
}

// ============================================================================
// UNAVAILABLE STUB
// ============================================================================

/// Provider used when no embedding backend is compiled in or viable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

impl EmbeddingProvider for UnavailableProvider {
    fn initialize(&self) -> ProviderStatus {
        ProviderStatus::Unavailable
    }

    fn embed(&self, _text: &str) -> Option<Vec<f32>> {
        None
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Vec<f32>>> {
        vec![None; texts.len()]
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn model_name(&self) -> &'static str {
        "unavailable"
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Return the first viable embedding provider
///
/// With the `embeddings` feature the local fastembed backend is
/// returned; its model load is deferred to `initialize`, so discovery
/// itself never blocks. Without the feature the stub is returned and
/// semantic search degrades to keyword-only.
pub fn discover() -> Arc<dyn EmbeddingProvider> {
    #[cfg(feature = "embeddings")]
    {
        Arc::new(super::local::LocalProvider::new())
    }
    #[cfg(not(feature = "embeddings"))]
    {
        Arc::new(UnavailableProvider)
    }
}

// ============================================================================
// TESTS
// ============================================================================
