use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ragdex::commands::{configure, index_documents, search};
use ragdex::config::Config;
use ragdex::{RagError, Result};

#[derive(Parser)]
#[command(name = "ragdex")]
#[command(about = "Document ingestion and retrieval pipeline for RAG applications")]
#[command(version)]
struct Cli {
    /// Override the configuration directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration, or write a default config file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a directory of documents and report snapshot statistics
    Index {
        /// Directory containing documents (pdf, txt, md)
        dir: PathBuf,
    },
    /// Ingest a directory, then retrieve context for a query
    Search {
        /// Directory containing documents (pdf, txt, md)
        dir: PathBuf,
        /// Query to answer; omit to start an interactive loop
        query: Option<String>,
        /// Number of chunks to retrieve per query
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::default_dir().map_err(|e| RagError::Config(e.to_string()))?,
    };

    match cli.command {
        Commands::Config { show } => {
            configure(&config_dir, show)?;
        }
        Commands::Index { dir } => {
            let config = Config::load(&config_dir)?;
            index_documents(&dir, &config)?;
        }
        Commands::Search { dir, query, k } => {
            let config = Config::load(&config_dir)?;
            search(&dir, query.as_deref(), k, &config)?;
        }
    }

    Ok(())
}
