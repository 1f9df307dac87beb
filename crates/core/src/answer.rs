use crate::config::RagConfig;
use crate::error::{QueryError, StorageError};
use crate::index::VectorIndex;
use crate::models::{Answer, SourceRef};
use crate::providers::{with_backoff, EmbeddingProvider, GenerationProvider};
use tokio::time::timeout;

/// Source snippets returned with an answer are truncated to this many
/// characters, with a trailing ellipsis when anything was cut.
pub const PREVIEW_CHARS: usize = 150;

/// Answers one question against the index: embed, retrieve, assemble a
/// grounded prompt, generate, attribute sources in retrieval rank order.
/// The index is never mutated during a query.
pub struct AnswerPipeline<'a, E, G> {
    config: &'a RagConfig,
    embedder: &'a E,
    generator: &'a G,
}

impl<'a, E, G> AnswerPipeline<'a, E, G>
where
    E: EmbeddingProvider,
    G: GenerationProvider,
{
    pub fn new(config: &'a RagConfig, embedder: &'a E, generator: &'a G) -> Self {
        Self {
            config,
            embedder,
            generator,
        }
    }

    pub async fn ask(&self, index: &VectorIndex, question: &str) -> Result<Answer, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        // Checked before any provider call: an empty index is a user-visible
        // "nothing indexed yet" condition, not a reason to burn a request.
        if index.is_empty() {
            return Err(QueryError::NoDocumentsIndexed);
        }

        let query_vector = with_backoff(|| self.embedder.embed(question)).await?;

        let hits = match index.search(&query_vector, self.config.top_k) {
            Err(StorageError::EmptyIndex) => return Err(QueryError::NoDocumentsIndexed),
            other => other?,
        };

        tracing::debug!(question, retrieved = hits.len(), "assembling grounded prompt");

        let prompt = build_prompt(hits.iter().map(|(entry, _)| entry.text.as_str()), question);

        let generated = match timeout(
            self.config.generation_timeout,
            with_backoff(|| self.generator.generate(&prompt)),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => return Err(QueryError::Timeout(self.config.generation_timeout)),
        };

        // Source order mirrors retrieval rank exactly; this is the
        // traceability contract.
        let sources = hits
            .iter()
            .map(|(entry, score)| SourceRef {
                content_preview: preview(&entry.text),
                document: entry.document.clone(),
                page: entry.page,
                score: *score,
            })
            .collect();

        Ok(Answer {
            answer: generated,
            sources,
        })
    }
}

/// Embeds the retrieved passages and the question into an instruction that
/// confines the model to the supplied context.
pub fn build_prompt<'a>(contexts: impl Iterator<Item = &'a str>, question: &str) -> String {
    let context = contexts.collect::<Vec<_>>().join("\n\n");

    format!(
        "You are a helpful AI assistant that provides accurate information \
         based on the given context.\n\n\
         Context:\n{context}\n\n\
         Question:\n{question}\n\n\
         Provide a detailed answer based only on the provided context. If \
         the context does not contain the information needed to answer the \
         question, state that you don't have enough information."
    )
}

fn preview(text: &str) -> String {
    let mut truncated = String::new();
    let mut chars = text.chars();

    for _ in 0..PREVIEW_CHARS {
        match chars.next() {
            Some(character) => truncated.push(character),
            None => return truncated,
        }
    }

    if chars.next().is_some() {
        truncated.push_str("...");
    }
    truncated
}
