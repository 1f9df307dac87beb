use crate::chunking::ChunkingConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Explicit configuration, constructed once by the caller and passed by
/// reference into the pipelines. The core receives already-resolved paths;
/// it never probes alternatives.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Directory of source PDFs. Enumerated non-recursively.
    pub source_dir: PathBuf,
    /// Directory owning the index's durable files. Co-located with, but
    /// distinct from, `source_dir`.
    pub index_dir: PathBuf,
    pub chunking: ChunkingConfig,
    pub top_k: usize,
    pub generation_timeout: Duration,
}

impl RagConfig {
    pub fn new(source_dir: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            index_dir: index_dir.into(),
            chunking: ChunkingConfig::default(),
            top_k: DEFAULT_TOP_K,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Fails fast before any work starts: the source directory must already
    /// exist and the chunking parameters must be coherent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_dir.is_dir() {
            return Err(ConfigError::MissingSourceDir(
                self.source_dir.display().to_string(),
            ));
        }
        self.chunking.validate()
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}
