//! Text-to-vector embedders.
//!
//! The store only depends on the [`Embedder`] trait. Two implementations ship
//! with the crate:
//! - [`OnnxEmbedder`]: local ONNX sentence-transformer, downloaded via the HF hub cache
//! - [`HashingEmbedder`]: model-free feature hashing, deterministic and offline

mod hashing;
mod onnx;

use thiserror::Error;

pub use hashing::HashingEmbedder;
pub use onnx::{DEFAULT_MODEL_ID, OnnxEmbedder};

/// Failure to turn text into vectors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// ONNX inference error.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Tokenization error.
    #[error("Tokenization error: {0}")]
    Tokenization(#[from] tokenizers::Error),

    /// ONNX session error.
    #[error("ONNX session error: {0}")]
    Onnx(#[from] ort::Error),

    /// HuggingFace Hub error.
    #[error("HuggingFace Hub error: {0}")]
    HfHub(#[from] hf_hub::api::sync::ApiError),

    /// Error reported by an external embedding provider (network, quota, ...).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The embedder returned a different number of vectors than inputs.
    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Maps text to fixed-length vectors.
///
/// Implementations must be deterministic for a fixed model configuration and
/// return vectors of one fixed dimensionality. Failures are returned as-is;
/// callers never retry.
///
/// Methods take `&mut self` because inference engines keep mutable session
/// state between calls.
pub trait Embedder {
    /// Embed a single text.
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts, returning one vector per input in input order.
    ///
    /// The default calls [`Embedder::embed_one`] in sequence. Override it when
    /// the backend supports native batching.
    fn embed_many(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed_one(text)
    }

    fn embed_many(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_many(texts)
    }
}

/// Scale a vector to unit length. Zero vectors stay zero.
pub(crate) fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|&x| x * x).sum::<f32>().sqrt();
    let norm = norm.max(1e-9);

    vec.iter().map(|&x| x / norm).collect()
}
