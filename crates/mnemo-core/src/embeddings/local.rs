//! Local Semantic Embeddings
//!
//! Uses fastembed for local ONNX inference with all-MiniLM-L6-v2
//! (384 dimensions). The model is loaded exactly once per process; the
//! first caller performs the download/load and concurrent callers block
//! on the same `OnceLock` outcome.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Mutex, OnceLock};

use super::{truncate_chars, Embedding, EmbeddingProvider, ProviderStatus, EMBED_INPUT_MAX_CHARS};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Embedding dimensions of all-MiniLM-L6-v2
pub const EMBEDDING_DIMENSIONS: usize = 384;

/// Model identity stored alongside each vector
pub const MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Batch size for efficient embedding generation
const BATCH_SIZE: usize = 32;

// ============================================================================
// GLOBAL MODEL
// ============================================================================

/// Result type for model initialization
static EMBEDDING_MODEL_RESULT: OnceLock<Result<Mutex<TextEmbedding>, String>> = OnceLock::new();

/// Get the default cache directory for fastembed models
/// Uses MNEMO_EMBED_CACHE env var, or falls back to the platform cache directory
fn get_cache_dir() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("MNEMO_EMBED_CACHE") {
        return std::path::PathBuf::from(path);
    }

    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "mnemo", "core") {
        return proj_dirs.cache_dir().join("fastembed");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/mnemo/fastembed");
    }

    std::path::PathBuf::from(".fastembed_cache")
}

/// Initialize the global embedding model
fn get_model() -> Result<std::sync::MutexGuard<'static, TextEmbedding>, String> {
    let result = EMBEDDING_MODEL_RESULT.get_or_init(|| {
        let cache_dir = get_cache_dir();

        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            tracing::warn!("Failed to create cache directory {:?}: {}", cache_dir, e);
        }

        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false)
            .with_cache_dir(cache_dir);

        TextEmbedding::try_new(options).map(Mutex::new).map_err(|e| {
            format!(
                "Failed to initialize all-MiniLM-L6-v2 embedding model: {}. \
                Ensure ONNX runtime is available and model files can be downloaded.",
                e
            )
        })
    });

    match result {
        Ok(model) => model.lock().map_err(|e| format!("Lock poisoned: {e}")),
        Err(err) => Err(err.clone()),
    }
}

// ============================================================================
// LOCAL PROVIDER
// ============================================================================

/// fastembed-backed embedding provider
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider {
    _unused: (),
}

impl LocalProvider {
    /// Create the provider; the model load is deferred to `initialize`
    pub fn new() -> Self {
        Self { _unused: () }
    }
}

impl EmbeddingProvider for LocalProvider {
    fn initialize(&self) -> ProviderStatus {
        match get_model() {
            Ok(_) => ProviderStatus::Available,
            Err(e) => {
                tracing::warn!("Embedding model not ready: {}", e);
                ProviderStatus::Unavailable
            }
        }
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if text.is_empty() {
            return None;
        }

        let mut model = match get_model() {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Embed skipped, model unavailable: {}", e);
                return None;
            }
        };

        let text = truncate_chars(text, EMBED_INPUT_MAX_CHARS);
        match model.embed(vec![text], None) {
            Ok(mut vectors) if !vectors.is_empty() => {
                let mut embedding = Embedding::new(vectors.swap_remove(0));
                embedding.normalize();
                Some(embedding.vector)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Embedding generation failed: {}", e);
                None
            }
        }
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Vec<f32>>> {
        if texts.is_empty() {
            return vec![];
        }

        let mut model = match get_model() {
            Ok(m) => m,
            Err(_) => return vec![None; texts.len()],
        };

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());

        // A failed chunk yields None for its items; later chunks still run
        for chunk in texts.chunks(BATCH_SIZE) {
            let truncated: Vec<&str> = chunk
                .iter()
                .map(|t| truncate_chars(t, EMBED_INPUT_MAX_CHARS))
                .collect();

            match model.embed(truncated, None) {
                Ok(vectors) if vectors.len() == chunk.len() => {
                    for vector in vectors {
                        let mut embedding = Embedding::new(vector);
                        embedding.normalize();
                        results.push(Some(embedding.vector));
                    }
                }
                Ok(_) | Err(_) => {
                    tracing::warn!("Embedding batch chunk failed ({} items)", chunk.len());
                    results.extend(std::iter::repeat_with(|| None).take(chunk.len()));
                }
            }
        }

        results
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    fn model_name(&self) -> &'static str {
        MODEL_NAME
    }
}
