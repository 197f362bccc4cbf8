
use tracing::{debug, warn};

use crate::embeddings::Embedder;
use crate::index::SimilarityIndex;
use crate::{RagError, Result};

/// Retrieve the `k` corpus chunks most relevant to a free-text query.
///
/// The query is embedded through the same batch contract as the corpus (a
/// one-element batch, wrapped here so callers never have to) and matched
/// against the index, and the returned positions are resolved against
/// `corpus`, most relevant first.
///
/// Positions the index reports that fall outside the corpus are skipped
/// rather than escalated: corpus and index can drift briefly while an
/// upstream rebuild is in flight, and a shorter result list degrades better
/// than a failed query. Embedding failures propagate to the caller, which
/// must decide whether to retry or answer without context.
#[inline]
pub fn retrieve_chunks(
    query: &str,
    corpus: &[String],
    index: &dyn SimilarityIndex,
    embedder: &dyn Embedder,
    k: usize,
) -> Result<Vec<String>> {
    if corpus.is_empty() || index.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let batch = [query.to_string()];
    let mut vectors = embedder.embed(&batch)?;
    if vectors.len() != 1 {
        return Err(RagError::Embedding(format!(
            "Expected exactly one query vector, got {}",
            vectors.len()
        )));
    }
    let query_vector = vectors.remove(0);

    let matches = index.search(&query_vector, k);
    debug!("Index returned {} candidates for k={}", matches.len(), k);

    let mut results = Vec::with_capacity(matches.len());
    for (position, distance) in matches {
        match corpus.get(position) {
            Some(chunk) => results.push(chunk.clone()),
            None => {
                warn!(
                    "Index position {} (distance {}) is outside the corpus of {} chunks, skipping",
                    position,
                    distance,
                    corpus.len()
                );
            }
        }
    }

    Ok(results)
}
