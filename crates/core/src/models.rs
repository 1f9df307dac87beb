use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One PDF in the source directory, described by filesystem state only.
/// The listing can diverge from what is actually indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub filename: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    /// SHA-256 over the first 1 MiB only. Cheap staleness signal; files
    /// that differ only past the first mebibyte collide.
    pub content_hash: String,
}

/// A bounded-length passage of page text, the unit of embedding and
/// retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub document: String,
    pub page: u32,
}

/// Persisted (vector, passage, metadata) triple. The index is an
/// append-only multiset: re-ingesting the same corpus without clearing it
/// first duplicates entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub text: String,
    pub document: String,
    pub page: u32,
}

/// An attributed passage backing an answer, in retrieval rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub content_preview: String,
    pub document: String,
    pub page: u32,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Success { pages: usize, chunks: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReport {
    pub processed: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}
