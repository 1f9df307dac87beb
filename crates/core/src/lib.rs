//! Retrieval-augmented question answering over a directory of PDFs:
//! decode pages, split them into overlapping chunks, embed them into a
//! persistent vector index, and answer questions grounded in the retrieved
//! passages with traceable sources.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod index;
pub mod ingest;
pub mod models;
pub mod providers;

#[cfg(test)]
pub(crate) mod testutil;

pub use answer::{build_prompt, AnswerPipeline, PREVIEW_CHARS};
pub use chunking::{ChunkingConfig, TextSplitter};
pub use config::{RagConfig, DEFAULT_GENERATION_TIMEOUT, DEFAULT_TOP_K};
pub use error::{
    ConfigError, DocumentError, IngestError, ProviderError, QueryError, StorageError,
};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use gemini::{GeminiClient, GEMINI_EMBEDDING_DIMENSIONS};
pub use index::{cosine_similarity, VectorIndex};
pub use ingest::{
    discover_pdf_files, hash_file_prefix, list_source_documents, IngestionPipeline,
};
pub use models::{
    Answer, Chunk, FileReport, FileStatus, IndexEntry, IngestionReport, SourceDocument, SourceRef,
};
pub use providers::{
    with_backoff, EmbeddingProvider, GenerationProvider, HashEmbedder,
    DEFAULT_EMBEDDING_DIMENSIONS,
};
