//! Model-free feature-hashing embedder.
//!
//! Each lowercase alphanumeric word is hashed (FNV-1a, 64-bit) into one of
//! `dimensions` buckets; the bucket counts are L2-normalized. Texts sharing
//! words land close together under cosine distance. No download, no state,
//! stable across platforms and releases.

use super::{Embedder, EmbeddingError, l2_normalize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Default vector width for [`HashingEmbedder`].
pub const DEFAULT_HASHING_DIMS: usize = 1024;

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimensions` floats.
    ///
    /// A width of 0 is bumped to 1.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Width of the produced vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn bucket(&self, word: &str) -> usize {
        (fnv1a(word.as_bytes()) % self.dimensions as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMS)
    }
}

impl Embedder for HashingEmbedder {
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut counts = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            counts[self.bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(l2_normalize(&counts))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(FNV_PRIME)
    })
}
