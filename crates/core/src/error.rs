use std::time::Duration;
use thiserror::Error;

/// Fatal at startup. The core never guesses paths or credentials; the
/// surrounding glue must hand it a valid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing api key: set {0}")]
    MissingApiKey(&'static str),

    #[error("source directory does not exist: {0}")]
    MissingSourceDir(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunking(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index data at {path} is corrupt: {details}")]
    Corrupt { path: String, details: String },

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("index holds no entries")]
    EmptyIndex,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rate limited the request: {0}")]
    RateLimited(String),

    #[error("provider rejected the input: {0}")]
    InvalidInput(String),

    #[error("unexpected response from {backend}: {details}")]
    BackendResponse {
        backend: &'static str,
        status: Option<u16>,
        details: String,
    },
}

impl ProviderError {
    /// Rate limits, transport timeouts, and 5xx responses are worth a
    /// retry with backoff; everything else should fail fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimited(_) => true,
            ProviderError::Http(error) => error.is_timeout() || error.is_connect(),
            ProviderError::BackendResponse { status, .. } => {
                status.is_some_and(|code| code >= 500)
            }
            ProviderError::InvalidInput(_) => false,
        }
    }
}

/// Failure of a single document during ingestion. Recorded in the
/// ingestion report; never aborts the run.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("pdf has no extractable text: {0}")]
    NoText(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] ProviderError),
}

/// Total inability to run an ingestion. Partial failure is not an error;
/// it is reported per file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no documents indexed yet")]
    NoDocumentsIndexed,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
