//! The `medassist` binary: ingest documents, ask questions, inspect the
//! index — the thin driver around [`medassist_engine::Engine`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use medassist_core::{AppConfig, AssistError};
use medassist_engine::Engine;
use medassist_model::OpenAiChatModel;
use medassist_rag::{Document, OpenAiEmbedder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medassist", about = "Retrieval-augmented medical QA over a private document collection", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector index from a directory of text documents.
    Ingest {
        /// Directory containing .txt/.md documents (form-feed page breaks honoured).
        #[arg(long, default_value = "data/docs")]
        docs: PathBuf,
        /// Output path for the index file.
        #[arg(long)]
        index: Option<PathBuf>,
        /// Characters per chunk.
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Overlap between chunks in characters.
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },
    /// Ask a single question against the built index.
    Ask {
        /// The question to answer.
        question: String,
    },
    /// Print index statistics as JSON.
    Stats,
}

fn build_engine(config: AppConfig) -> Result<Engine> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable not set")?;

    let embedder = OpenAiEmbedder::new(api_key.clone(), &config.embedding)?;
    let chat_model = OpenAiChatModel::new(api_key, &config.generation)?;

    Ok(Engine::builder()
        .config(config)
        .embedder(Arc::new(embedder))
        .chat_model(Arc::new(chat_model))
        .build()?)
}

/// Recursively collect .txt/.md files under a directory.
fn collect_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(path) = pending.pop() {
        for entry in std::fs::read_dir(&path)
            .with_context(|| format!("failed to read directory '{}'", path.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let is_text = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            );
            if !is_text {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            documents.push(Document::new(source, text));
        }
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(documents)
}

async fn run_ingest(
    mut config: AppConfig,
    docs: PathBuf,
    index: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
) -> Result<()> {
    if let Some(path) = index {
        config.index_path = path;
    }
    if let Some(size) = chunk_size {
        config.chunking.chunk_size = size;
    }
    if let Some(overlap) = chunk_overlap {
        config.chunking.chunk_overlap = overlap;
    }

    let engine = build_engine(config)?;
    let documents = collect_documents(&docs)?;
    if documents.is_empty() {
        bail!("no .txt/.md documents found in '{}'", docs.display());
    }
    info!(document_count = documents.len(), "starting ingestion");

    let start = Instant::now();
    let stats = engine.rebuild_index(&documents).await?;
    info!(
        documents = stats.documents,
        chunks = stats.chunks,
        dimensions = stats.dimensions,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ingestion complete"
    );
    Ok(())
}

async fn run_ask(config: AppConfig, question: String) -> Result<()> {
    let engine = build_engine(config)?;
    engine.load_index().map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match engine.handle_query(&question).await {
        Ok(answer) => {
            println!("{}", answer.text);
            if !answer.sources.is_empty() {
                println!("\nSources:");
                for citation in &answer.sources {
                    println!("  - {} (p.{})", citation.source, citation.page);
                }
            }
            println!("{}", answer.disclaimer);
            Ok(())
        }
        Err(e) => bail!(e.user_message()),
    }
}

fn run_stats(config: AppConfig) -> Result<()> {
    let engine = build_engine(config)?;
    // A missing index is a valid pre-ingestion state, mirrored in the output.
    match engine.load_index() {
        Ok(()) => {}
        Err(AssistError::IndexUnavailable { reason }) => warn!(%reason, "index not loaded"),
        Err(e) => return Err(e.into()),
    }
    println!("{}", serde_json::to_string_pretty(&engine.stats())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Command::Ingest { docs, index, chunk_size, chunk_overlap } => {
            run_ingest(config, docs, index, chunk_size, chunk_overlap).await
        }
        Command::Ask { question } => run_ask(config, question).await,
        Command::Stats => run_stats(config),
    }
}
