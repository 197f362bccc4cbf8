//! Integration tests for the full ingestion and retrieval pipeline.
//!
//! Tests the complete flow: discover → extract → chunk → embed → index →
//! retrieve, using a deterministic local embedder so no network is involved.

use ragdex::config::Config;
use ragdex::embeddings::Embedder;
use ragdex::ingest::{build_snapshot, discover_documents};
use ragdex::retriever::retrieve_chunks;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Deterministic embedder scoring texts against a small vocabulary, one
/// dimension per term, normalized so squared-L2 ranks by topic.
struct VocabularyEmbedder;

const VOCABULARY: [&str; 4] = ["volcano", "glacier", "harbor", "meadow"];

impl Embedder for VocabularyEmbedder {
    fn embed(&self, texts: &[String]) -> ragdex::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let mut vector: Vec<f32> = VOCABULARY
                    .iter()
                    .map(|term| lower.matches(term).count() as f32)
                    .collect();
                let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for value in &mut vector {
                        *value /= norm;
                    }
                }
                vector
            })
            .collect())
    }
}

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("volcano.txt"),
        "The volcano erupted overnight. Ash from the volcano covered the town below. ".repeat(4),
    )
    .expect("can write test file");
    fs::write(
        dir.join("glacier.md"),
        "The glacier retreats each summer. Meltwater from the glacier feeds the valley. ".repeat(4),
    )
    .expect("can write test file");
    fs::write(
        dir.join("harbor.txt"),
        "Boats crowd the harbor at dawn. The harbor master logs every arrival. ".repeat(4),
    )
    .expect("can write test file");
}

fn pipeline_config() -> Config {
    let mut config = Config::default();
    config.chunking.chunk_size = 120;
    config.chunking.chunk_overlap = 24;
    config.ingest.max_workers = 2;
    config
}

#[test]
fn full_pipeline_retrieves_topical_chunks() {
    let dir = tempdir().expect("can create temp dir");
    write_corpus(dir.path());

    let paths = discover_documents(dir.path()).expect("discovery succeeds");
    assert_eq!(paths.len(), 3);

    let embedder = VocabularyEmbedder;
    let snapshot =
        build_snapshot(&paths, &pipeline_config(), &embedder).expect("ingestion succeeds");

    assert_eq!(snapshot.len(), snapshot.index().len());
    assert_eq!(snapshot.stats().files_ingested, 3);

    let results = snapshot
        .retrieve("what happened at the volcano?", &embedder, 3)
        .expect("retrieval succeeds");

    assert!(!results.is_empty());
    assert!(
        results[0].contains("[Source: volcano.txt]"),
        "most relevant chunk should come from volcano.txt: {}",
        results[0]
    );
}

#[test]
fn every_chunk_carries_its_source_label() {
    let dir = tempdir().expect("can create temp dir");
    write_corpus(dir.path());

    let paths = discover_documents(dir.path()).expect("discovery succeeds");
    let snapshot =
        build_snapshot(&paths, &pipeline_config(), &VocabularyEmbedder).expect("ingestion succeeds");

    for chunk in snapshot.corpus() {
        assert!(chunk.starts_with("[Source: "), "unlabeled chunk: {chunk}");
    }
}

#[test]
fn adding_a_document_means_a_new_snapshot() {
    let dir = tempdir().expect("can create temp dir");
    write_corpus(dir.path());

    let embedder = VocabularyEmbedder;
    let config = pipeline_config();

    let paths = discover_documents(dir.path()).expect("discovery succeeds");
    let first = build_snapshot(&paths, &config, &embedder).expect("ingestion succeeds");

    let miss = first
        .retrieve("wildflowers in the meadow", &embedder, 1)
        .expect("retrieval succeeds");
    assert!(miss.is_empty() || !miss[0].contains("meadow.txt"));

    // Corpus changed: rebuild the whole snapshot and swap it for the old one.
    fs::write(
        dir.path().join("meadow.txt"),
        "Wildflowers fill the meadow in spring. Bees work the meadow until dusk. ".repeat(4),
    )
    .expect("can write test file");

    let paths = discover_documents(dir.path()).expect("discovery succeeds");
    let second = build_snapshot(&paths, &config, &embedder).expect("ingestion succeeds");

    assert!(second.len() > first.len());
    let hit = second
        .retrieve("wildflowers in the meadow", &embedder, 1)
        .expect("retrieval succeeds");
    assert!(
        hit[0].contains("[Source: meadow.txt]"),
        "new snapshot should surface the new document: {}",
        hit[0]
    );
}

#[test]
fn retrieval_is_read_only_and_repeatable() {
    let dir = tempdir().expect("can create temp dir");
    write_corpus(dir.path());

    let embedder = VocabularyEmbedder;
    let paths = discover_documents(dir.path()).expect("discovery succeeds");
    let snapshot =
        build_snapshot(&paths, &pipeline_config(), &embedder).expect("ingestion succeeds");

    let first = retrieve_chunks(
        "ships waiting in the harbor",
        snapshot.corpus(),
        snapshot.index(),
        &embedder,
        2,
    )
    .expect("retrieval succeeds");
    let second = retrieve_chunks(
        "ships waiting in the harbor",
        snapshot.corpus(),
        snapshot.index(),
        &embedder,
        2,
    )
    .expect("retrieval succeeds");

    assert_eq!(first, second);
    assert!(first[0].contains("[Source: harbor.txt]"));
}
