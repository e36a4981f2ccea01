//! Memory store data types.

use serde::Serialize;

/// A stored memory: identifier, embedding and verbatim source text.
///
/// Records are immutable once inserted; edits are modelled as
/// delete-then-insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRecord {
    /// Unique identifier (UUID v4) assigned at insert time.
    pub id: String,
    /// Source text, exactly as inserted.
    pub text: String,
    /// Embedding produced for `text`.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// RFC 3339 insertion timestamp.
    pub created_at: String,
}

/// One nearest-neighbour result.
///
/// `distance` is the cosine distance `1 - cos(query, record)`, in `[0, 2]`.
/// Smaller means more similar; identical directions give `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub distance: f64,
}
