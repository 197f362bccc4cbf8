
use tracing::{debug, warn};

use crate::{RagError, Result};

/// Nearest-neighbor search over a fixed set of vectors.
///
/// Positions returned by [`search`](SimilarityIndex::search) refer to the
/// insertion order of the vectors the index was built from; callers resolve
/// them against a corpus kept in the same order.
pub trait SimilarityIndex {
    /// Return up to `k` `(position, distance)` pairs, best match first.
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;

    /// Number of vectors in the index.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact brute-force index using squared Euclidean distance.
///
/// Built once per corpus state and immutable afterwards; any corpus change
/// means re-embedding and rebuilding. Ties in distance resolve to the vector
/// inserted first.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index from embedding vectors, in corpus order.
    ///
    /// All vectors must share one dimensionality; vectors produced by
    /// different embedding models cannot be compared by distance.
    #[inline]
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = vectors.first().map_or(0, Vec::len);

        if let Some(pos) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(RagError::Index(format!(
                "vector {} has dimension {}, expected {}",
                pos,
                vectors[pos].len(),
                dimension
            )));
        }

        debug!(
            "Built flat index with {} vectors of dimension {}",
            vectors.len(),
            dimension
        );

        Ok(Self { dimension, vectors })
    }

    /// Dimensionality of the indexed vectors; 0 for an empty index.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl SimilarityIndex for FlatIndex {
    #[inline]
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if self.vectors.is_empty() || k == 0 {
            return Vec::new();
        }

        if query.len() != self.dimension {
            warn!(
                "Query dimension {} does not match index dimension {}, returning no matches",
                query.len(),
                self.dimension
            );
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, vector)| (pos, squared_l2(query, vector)))
            .collect();

        // Stable sort keeps insertion order for equal distances.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
