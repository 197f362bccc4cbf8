use anyhow::{Context, Result, bail};
use console::style;
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::embeddings::{Embedder, OpenAiClient};
use crate::ingest::{KnowledgeSnapshot, build_snapshot, discover_documents};

/// Print the effective configuration, or write a default config file for
/// editing when none exists yet.
#[inline]
pub fn configure(config_dir: &Path, show: bool) -> Result<()> {
    if show {
        let config = Config::load(config_dir).context("Failed to load configuration")?;
        let rendered =
            toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("Configuration directory: {}", config_dir.display());
        println!();
        print!("{rendered}");
        return Ok(());
    }

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        println!("Configuration already exists: {}", config_path.display());
        println!("Edit it directly, or run with --show to view the current values.");
        return Ok(());
    }

    let path = Config::default()
        .save(config_dir)
        .context("Failed to write default configuration")?;
    println!(
        "{} {}",
        style("✓ Wrote default configuration to").green(),
        style(path.display()).cyan()
    );
    Ok(())
}

/// Ingest a directory and report what the resulting snapshot looks like.
#[inline]
pub fn index_documents(dir: &Path, config: &Config) -> Result<()> {
    let client = embedding_client(config)?;
    let snapshot = ingest(dir, config, &client)?;

    println!();
    println!("{}", style("Snapshot ready").bold());
    println!("  Files ingested:  {}", snapshot.stats().files_ingested);
    println!("  Files skipped:   {}", snapshot.stats().files_skipped);
    println!("  Chunks indexed:  {}", snapshot.stats().chunks);
    println!("  Vector dimension: {}", snapshot.index().dimension());
    println!("  Built at:        {}", snapshot.built_at().to_rfc3339());
    Ok(())
}

/// Ingest a directory, then answer a single query or run an interactive
/// retrieval loop when no query was given.
#[inline]
pub fn search(dir: &Path, query: Option<&str>, k: usize, config: &Config) -> Result<()> {
    let client = embedding_client(config)?;
    let snapshot = ingest(dir, config, &client)?;

    match query {
        Some(question) => {
            let results = snapshot
                .retrieve(question, &client, k)
                .context("Retrieval failed")?;
            print_results(&results);
        }
        None => interactive_loop(&snapshot, &client, k)?,
    }
    Ok(())
}

fn embedding_client(config: &Config) -> Result<OpenAiClient> {
    let api_key = std::env::var(&config.embedding.api_key_env).with_context(|| {
        format!(
            "{} is not set; export it or point api_key_env at another variable",
            config.embedding.api_key_env
        )
    })?;
    Ok(OpenAiClient::new(&config.embedding, api_key)?)
}

fn ingest(dir: &Path, config: &Config, client: &OpenAiClient) -> Result<KnowledgeSnapshot> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let started = Instant::now();
    let paths = discover_documents(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    info!("Ingesting {} files from {:?}", paths.len(), dir);

    let snapshot = build_snapshot(&paths, config, client)
        .with_context(|| format!("Failed to ingest {}", dir.display()))?;

    println!(
        "Indexed {} chunks from {} files in {:.1?}",
        snapshot.stats().chunks,
        snapshot.stats().files_ingested,
        started.elapsed()
    );
    Ok(snapshot)
}

fn interactive_loop(
    snapshot: &KnowledgeSnapshot,
    embedder: &dyn Embedder,
    k: usize,
) -> Result<()> {
    println!();
    println!(
        "{}",
        style("Ready. Ask a question, or type 'exit' to quit.").bold()
    );

    let stdin = io::stdin();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        // Upstream failures surface here instead of being swallowed; an
        // empty result is reported as such rather than invented.
        match snapshot.retrieve(question, embedder, k) {
            Ok(results) => print_results(&results),
            Err(error) => {
                eprintln!("{} {}", style("Retrieval failed:").red(), error);
            }
        }
    }

    Ok(())
}

fn print_results(results: &[String]) {
    if results.is_empty() {
        println!("{}", style("No matching context found.").yellow());
        return;
    }

    println!(
        "{}",
        style(format!("{} relevant chunks:", results.len())).bold()
    );
    println!();
    println!(
        "{}",
        results
            .iter()
            .enumerate()
            .map(|(position, chunk)| format!("{}. {}", position + 1, chunk))
            .join("\n\n")
    );
}
