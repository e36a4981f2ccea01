//! Nearest-neighbour queries over a collection.

use super::{Database, Error, embedding};
use crate::memory_types::SearchHit;

pub type Result<T> = std::result::Result<T, Error>;

/// Validate search limit is positive. Limits past the collection size are fine.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::InvalidLimit(
            "Limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

impl Database {
    /// Return the `k` records closest to `query` by cosine distance.
    ///
    /// Scans every record of the collection, so ordering is exact: results
    /// are sorted by ascending distance, ties keep insertion order. A
    /// collection that never received a record returns an empty result.
    ///
    /// `k` may exceed the collection size; every record is returned then.
    ///
    /// # Errors
    ///
    /// Returns error if `k` is 0, the collection is unknown, the
    /// query width differs from the collection's, or the query fails.
    pub fn query_nearest(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        validate_limit(k)?;

        let dims = match self.collection_dimensions(collection)? {
            Some(dims) => dims,
            None => return Ok(Vec::new()),
        };
        if query.len() != dims {
            return Err(Error::MismatchedDimensions {
                expected: dims,
                actual: query.len(),
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, content, embedding
            FROM memories
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;

        let mut hits = Vec::new();
        for row_result in rows {
            let (id, text, blob) = row_result?;
            let stored = embedding::blob_to_vec(&blob, dims)?;
            let distance = embedding::cosine_distance(query, &stored)?;
            hits.push(SearchHit { id, text, distance });
        }

        // Stable: equal distances stay in rowid order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}
