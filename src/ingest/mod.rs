
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::chunker::chunk_text;
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::extract::{extract_text, is_supported};
use crate::index::FlatIndex;
use crate::retriever::retrieve_chunks;
use crate::{RagError, Result};

/// An immutable corpus/index pair built from one ingestion pass.
///
/// The corpus position of every chunk matches the position of its vector in
/// the index; the constructor refuses mismatched halves, and neither half can
/// be mutated afterwards. Refreshing the knowledge base means building a new
/// snapshot and dropping this one, so the pairing is never observable in a
/// half-updated state.
pub struct KnowledgeSnapshot {
    corpus: Vec<String>,
    index: FlatIndex,
    built_at: DateTime<Utc>,
    stats: IngestStats,
}

/// Counters describing one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files_ingested: usize,
    pub files_skipped: usize,
    pub chunks: usize,
}

impl KnowledgeSnapshot {
    #[inline]
    pub fn new(corpus: Vec<String>, index: FlatIndex, stats: IngestStats) -> Result<Self> {
        if corpus.len() != index.len() {
            return Err(RagError::Index(format!(
                "Corpus has {} chunks but index has {} vectors",
                corpus.len(),
                index.len()
            )));
        }

        Ok(Self {
            corpus,
            index,
            built_at: Utc::now(),
            stats,
        })
    }

    #[inline]
    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }

    #[inline]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    #[inline]
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Retrieve the `k` chunks most relevant to `query`.
    #[inline]
    pub fn retrieve(&self, query: &str, embedder: &dyn Embedder, k: usize) -> Result<Vec<String>> {
        retrieve_chunks(query, &self.corpus, &self.index, embedder, k)
    }
}

/// Recursively collect ingestable files under `dir`, sorted by path.
///
/// Sorting keeps corpus order, and with it index positions, stable across
/// runs regardless of directory iteration order.
#[inline]
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    collect_files(dir, &mut paths)?;
    paths.sort();

    debug!("Discovered {} ingestable files under {:?}", paths.len(), dir);
    Ok(paths)
}

fn collect_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, paths)?;
        } else if is_supported(&path) {
            paths.push(path);
        }
    }
    Ok(())
}

/// Prefix a chunk with its source file so retrieved context carries
/// provenance. Applied after chunking; the chunker itself stays agnostic.
#[inline]
pub fn label_chunk(source: &str, chunk: &str) -> String {
    format!("[Source: {source}] {chunk}")
}

/// Run the full ingestion pipeline over `paths` and build a snapshot.
///
/// Extraction and chunking run per file on a worker pool capped at the
/// configured size; file order, and therefore corpus order, stays
/// deterministic. Files that fail extraction are skipped with a warning.
/// All labeled chunks are then embedded in one batched pass and loaded into
/// a fresh index together with the corpus.
#[inline]
pub fn build_snapshot(
    paths: &[PathBuf],
    config: &Config,
    embedder: &dyn Embedder,
) -> Result<KnowledgeSnapshot> {
    // Chunking parameters are validated up front: a bad configuration must
    // halt ingestion, while a bad file only skips that file.
    config
        .validate()
        .map_err(|e| RagError::Config(e.to_string()))?;

    if paths.is_empty() {
        return Err(RagError::Extraction(
            "No ingestable documents found".to_string(),
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.ingest.max_workers)
        .build()
        .map_err(|e| RagError::Other(anyhow::anyhow!("Failed to build worker pool: {e}")))?;

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(paths.len() as u64).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Ingesting {msg}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };

    let per_file: Vec<(&PathBuf, Result<Vec<String>>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                bar.set_message(path.display().to_string());
                let chunks =
                    extract_text(path).and_then(|text| chunk_text(&text, &config.chunking));
                bar.inc(1);
                (path, chunks)
            })
            .collect()
    });
    bar.finish_and_clear();

    let mut corpus = Vec::new();
    let mut stats = IngestStats::default();

    for (path, outcome) in per_file {
        match outcome {
            Ok(chunks) => {
                let source = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                corpus.extend(chunks.iter().map(|chunk| label_chunk(&source, chunk)));
                stats.files_ingested += 1;
            }
            Err(error) => {
                warn!("Skipping {:?}: {}", path, error);
                stats.files_skipped += 1;
            }
        }
    }

    if corpus.is_empty() {
        return Err(RagError::Extraction(format!(
            "No text could be extracted from {} files",
            paths.len()
        )));
    }
    stats.chunks = corpus.len();

    info!(
        "Embedding {} chunks from {} files ({} skipped)",
        stats.chunks, stats.files_ingested, stats.files_skipped
    );

    let vectors = embedder.embed(&corpus)?;
    if vectors.len() != corpus.len() {
        return Err(RagError::Embedding(format!(
            "Embedder returned {} vectors for {} chunks",
            vectors.len(),
            corpus.len()
        )));
    }

    let index = FlatIndex::build(vectors)?;
    KnowledgeSnapshot::new(corpus, index, stats)
}
