use clap::{Parser, Subcommand};
use pdf_rag_core::{
    list_source_documents, AnswerPipeline, ConfigError, GeminiClient, IngestionPipeline,
    RagConfig, VectorIndex,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the source PDFs.
    #[arg(long, default_value = "data/pdfs")]
    source_dir: PathBuf,

    /// Directory holding the vector index's durable files.
    #[arg(long, default_value = "vector_store")]
    index_dir: PathBuf,

    /// Google Generative Language API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Index every PDF in the source directory and print the report.
    Ingest,
    /// Ask a question against the index and print the answer with sources.
    Ask {
        /// The question to answer.
        #[arg(long)]
        question: String,
        /// Number of passages to retrieve.
        #[arg(long, default_value = "5")]
        top_k: usize,
        /// Abandon generation after this many seconds.
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },
    /// List the source directory's PDFs with size, mtime, and content hash.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = RagConfig::new(&cli.source_dir, &cli.index_dir);

    match cli.command {
        Command::Ingest => {
            let client = gemini_client(&cli.api_key)?;
            let mut index = VectorIndex::open_or_create(&cli.index_dir)?;

            info!(source_dir = %cli.source_dir.display(), "ingesting");
            let report = IngestionPipeline::new(&config, &client)
                .run(&mut index)
                .await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            println!(
                "processed {} of {} file(s); index now holds {} entries",
                report.processed,
                report.files.len(),
                index.count()
            );
        }
        Command::Ask {
            question,
            top_k,
            timeout_secs,
        } => {
            config.top_k = top_k;
            config.generation_timeout = Duration::from_secs(timeout_secs);

            let client = gemini_client(&cli.api_key)?;
            let index = VectorIndex::open_or_create(&cli.index_dir)?;

            let answer = AnswerPipeline::new(&config, &client, &client)
                .ask(&index, &question)
                .await?;

            println!("{}", answer.answer);
            println!();
            for (rank, source) in answer.sources.iter().enumerate() {
                println!(
                    "[{}] {} (page {}, score {:.4})",
                    rank + 1,
                    source.document,
                    source.page,
                    source.score
                );
                println!("    {}", source.content_preview);
            }
        }
        Command::List => {
            let documents = list_source_documents(&cli.source_dir)?;
            for document in &documents {
                println!(
                    "{}  {} bytes  modified {}  hash {}",
                    document.filename,
                    document.size_bytes,
                    document.modified.to_rfc3339(),
                    document.content_hash
                );
            }
            println!("{} document(s)", documents.len());
        }
    }

    Ok(())
}

fn gemini_client(api_key: &Option<String>) -> Result<GeminiClient, ConfigError> {
    api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .map(GeminiClient::new)
        .ok_or(ConfigError::MissingApiKey("GEMINI_API_KEY"))
}
