use crate::chunking::TextSplitter;
use crate::config::RagConfig;
use crate::error::{ConfigError, DocumentError, IngestError, ProviderError};
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::index::VectorIndex;
use crate::models::{
    Chunk, FileReport, FileStatus, IndexEntry, IngestionReport, SourceDocument,
};
use crate::providers::{with_backoff, EmbeddingProvider};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Only the first 1 MiB of a file contributes to its content hash. Cheap
/// staleness signal, not an integrity check.
const HASH_PREFIX_BYTES: u64 = 1024 * 1024;

/// Readable `.pdf` files directly inside `dir` (non-recursive), sorted for
/// deterministic run order.
pub fn discover_pdf_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::MissingSourceDir(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort_unstable();
    Ok(files)
}

/// Lightweight filesystem view of the source directory. Reflects what is on
/// disk right now, not what the index contains.
pub fn list_source_documents(dir: &Path) -> Result<Vec<SourceDocument>, IngestError> {
    let mut documents = Vec::new();

    for path in discover_pdf_files(dir)? {
        let metadata = fs::metadata(&path)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();

        documents.push(SourceDocument {
            filename: file_name(&path)?,
            size_bytes: metadata.len(),
            modified,
            content_hash: hash_file_prefix(&path)?,
        });
    }

    Ok(documents)
}

/// SHA-256 of the first [`HASH_PREFIX_BYTES`] of the file, hex-encoded.
pub fn hash_file_prefix(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = file.take(HASH_PREFIX_BYTES);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn file_name(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))
}

/// Runs decode -> split -> embed -> insert for every PDF in the source
/// directory, isolating per-document failures into the report.
pub struct IngestionPipeline<'a, E, X = LopdfExtractor> {
    config: &'a RagConfig,
    embedder: &'a E,
    extractor: X,
}

impl<'a, E: EmbeddingProvider> IngestionPipeline<'a, E, LopdfExtractor> {
    pub fn new(config: &'a RagConfig, embedder: &'a E) -> Self {
        Self::with_extractor(config, embedder, LopdfExtractor)
    }
}

impl<'a, E, X> IngestionPipeline<'a, E, X>
where
    E: EmbeddingProvider,
    X: PdfExtractor,
{
    pub fn with_extractor(config: &'a RagConfig, embedder: &'a E, extractor: X) -> Self {
        Self {
            config,
            embedder,
            extractor,
        }
    }

    /// One ingestion run. A document that fails to load, split, or embed is
    /// recorded and skipped; the run continues. The index is persisted
    /// exactly once at the end, so a crash mid-run loses the whole run's
    /// inserts and the run must be repeated.
    pub async fn run(&self, index: &mut VectorIndex) -> Result<IngestionReport, IngestError> {
        self.config.validate()?;
        let splitter = TextSplitter::new(self.config.chunking)?;
        let files = discover_pdf_files(&self.config.source_dir)?;

        tracing::info!(
            source_dir = %self.config.source_dir.display(),
            file_count = files.len(),
            "starting ingestion run"
        );

        let mut report = IngestionReport {
            processed: 0,
            failed: 0,
            files: Vec::with_capacity(files.len()),
        };
        let mut pending: Vec<IndexEntry> = Vec::new();

        for path in files {
            let filename = file_name(&path)?;

            match self.process_document(&path, &filename, &splitter).await {
                Ok(outcome) => {
                    tracing::info!(
                        file = %filename,
                        pages = outcome.pages,
                        chunks = outcome.entries.len(),
                        "document indexed"
                    );
                    report.processed += 1;
                    report.files.push(FileReport {
                        filename,
                        status: FileStatus::Success {
                            pages: outcome.pages,
                            chunks: outcome.entries.len(),
                        },
                    });
                    pending.extend(outcome.entries);
                }
                Err(error) => {
                    tracing::warn!(file = %filename, %error, "document skipped");
                    report.failed += 1;
                    report.files.push(FileReport {
                        filename,
                        status: FileStatus::Failed {
                            error: error.to_string(),
                        },
                    });
                }
            }
        }

        index.insert(pending);
        index.persist()?;

        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            indexed_entries = index.count(),
            "ingestion run complete"
        );

        Ok(report)
    }

    async fn process_document(
        &self,
        path: &Path,
        filename: &str,
        splitter: &TextSplitter,
    ) -> Result<DocumentOutcome, DocumentError> {
        let pages = self.extractor.extract_pages(path)?;

        let mut chunks: Vec<Chunk> = Vec::new();
        for page in &pages {
            for text in splitter.split(&page.text) {
                chunks.push(Chunk {
                    text,
                    document: filename.to_string(),
                    page: page.number,
                });
            }
        }

        if chunks.is_empty() {
            return Err(DocumentError::NoText(filename.to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = with_backoff(|| self.embedder.embed_batch(&texts)).await?;

        if vectors.len() != chunks.len() {
            return Err(DocumentError::Embedding(ProviderError::BackendResponse {
                backend: "embedding",
                status: None,
                details: format!(
                    "requested {} vectors, got {}",
                    chunks.len(),
                    vectors.len()
                ),
            }));
        }

        let page_count = pages.len();
        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                vector,
                text: chunk.text,
                document: chunk.document,
                page: chunk.page,
            })
            .collect();

        Ok(DocumentOutcome {
            entries,
            pages: page_count,
        })
    }
}

struct DocumentOutcome {
    entries: Vec<IndexEntry>,
    pages: usize,
}
