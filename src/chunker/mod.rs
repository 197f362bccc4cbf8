
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RagError, Result};

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Soft upper bound on chunk length, in characters
    pub chunk_size: usize,
    /// Characters of context repeated from the previous chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
        }
    }
}

/// Sanity ceiling on chunk size; larger values are almost certainly a typo
/// and would produce chunks no embedding model accepts.
pub const MAX_CHUNK_SIZE: usize = 100_000;

impl ChunkingConfig {
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(RagError::Config(format!(
                "chunk_size {} exceeds maximum of {}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split raw document text into bounded, overlapping chunks.
///
/// The text is tokenized into alternating runs of whitespace and
/// non-whitespace so every character, including layout whitespace, survives
/// into exactly the chunks that cover it. Tokens accumulate into a buffer
/// that is flushed as one chunk the moment its character count reaches
/// `chunk_size`; the next buffer is seeded with a tail slice of the flushed
/// tokens proportional to `chunk_overlap / chunk_size`, so context carries
/// across the cut regardless of how token boundaries fall.
///
/// Pure and deterministic; invalid configuration fails before any work.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    config.validate()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = split_tokens(text);
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_chars = 0usize;

    for token in tokens {
        buffer_chars += token.chars().count();
        buffer.push(token);

        if buffer_chars >= config.chunk_size {
            chunks.push(buffer.concat());

            // Seed the next chunk with the tail of this one. The kept token
            // count tracks the overlap ratio but always stays strictly below
            // the buffer length so the buffer shrinks at every flush.
            let keep = overlap_token_count(buffer.len(), config);
            buffer.drain(..buffer.len() - keep);
            buffer_chars = buffer.iter().map(|t| t.chars().count()).sum();
        }
    }

    if !buffer.is_empty() {
        chunks.push(buffer.concat());
    }

    debug!(
        "Chunked {} chars into {} chunks (size={}, overlap={})",
        text.chars().count(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

/// Number of trailing tokens to carry into the next chunk.
///
/// Proportional to the overlap ratio applied to the flushed buffer's token
/// count, at least one token, and strictly fewer than the buffer holds. A
/// one-token buffer carries nothing forward.
fn overlap_token_count(buffer_tokens: usize, config: &ChunkingConfig) -> usize {
    if buffer_tokens <= 1 {
        return 0;
    }
    let proportional = buffer_tokens * config.chunk_overlap / config.chunk_size;
    proportional.max(1).min(buffer_tokens - 1)
}

/// Split text into alternating runs of non-whitespace and whitespace.
///
/// Concatenating the runs reproduces the input exactly.
fn split_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_whitespace = None;

    for (pos, ch) in text.char_indices() {
        let ws = ch.is_whitespace();
        if let Some(prev) = in_whitespace {
            if prev != ws {
                tokens.push(&text[start..pos]);
                start = pos;
            }
        }
        in_whitespace = Some(ws);
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}
