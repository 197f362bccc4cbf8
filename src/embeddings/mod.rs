// Embeddings module
// Batch embedding contract plus the remote OpenAI-compatible client

pub mod openai;

pub use openai::OpenAiClient;

use crate::Result;

/// Converts batches of text into fixed-dimension vectors.
///
/// The contract has a single fixed shape: a sequence of texts in, one vector
/// per text out, in the same order. Callers never wrap or unwrap single
/// inputs themselves; components that embed a lone string batch it
/// internally.
pub trait Embedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
