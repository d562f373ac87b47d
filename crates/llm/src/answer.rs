//! Retrieval-augmented answering over a built collection: embed the
//! question, pull the most similar chunks, and hand them to the generator
//! as grounding context.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use pdfchat_core::config::RetrievalConfig;
use pdfchat_core::ScoredChunk;
use pdfchat_ingest::{Embedder, EmbeddingError};
use pdfchat_store::CollectionHandle;

use crate::provider::{Generator, LlmError, Message, Role};

/// System prompt grounding the model in the retrieved excerpts.
const SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about a document. \
Use only the provided context excerpts to answer. If the context does not contain the answer, \
say you don't know rather than guessing.";

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("collection is not ready: ingest the document first")]
    CollectionNotReady,

    #[error("collection was embedded with {collection} but the query embedder is {query}")]
    EmbeddingSpaceMismatch { collection: String, query: String },

    #[error("no chunk scored at or above the relevance floor {min_score}")]
    NoRelevantContext { min_score: f32 },

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// One question/answer exchange, replayed into later prompts so follow-up
/// questions can refer back to earlier answers.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// The generated answer plus the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The generation backend's response text, verbatim.
    pub text: String,
    /// Retrieved chunks in descending similarity order.
    pub sources: Vec<ScoredChunk>,
}

/// Answers questions against a ready [`CollectionHandle`].
///
/// Every call re-embeds the question and re-runs retrieval; nothing is
/// cached between calls. The embedder must be the same one the collection
/// was built with; the manifest check below rejects anything else.
pub struct Answerer {
    embedder: Arc<dyn Embedder>,
    generator: Box<dyn Generator>,
    retrieval: RetrievalConfig,
    temperature: f32,
    max_tokens: u32,
}

impl Answerer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Box<dyn Generator>,
        retrieval: RetrievalConfig,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            embedder,
            generator,
            retrieval,
            temperature,
            max_tokens,
        }
    }

    /// The generation model answering questions, for the startup banner.
    pub fn model_id(&self) -> String {
        self.generator.model_id()
    }

    /// Answer `question` against `handle`, replaying `history` into the
    /// prompt.
    pub async fn answer(
        &self,
        question: &str,
        history: &[ChatTurn],
        handle: &CollectionHandle,
    ) -> Result<Answer, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }

        let collection = handle.collection().ok_or(AnswerError::CollectionNotReady)?;
        if collection.is_empty() {
            return Err(AnswerError::CollectionNotReady);
        }

        // Vectors from different models or dimensionalities are not
        // comparable; refuse instead of returning nonsense similarities.
        let query_model = self.embedder.model_id();
        if collection.manifest.embedding_model != query_model
            || collection.manifest.dimensions != self.embedder.dimensions()
        {
            return Err(AnswerError::EmbeddingSpaceMismatch {
                collection: format!(
                    "{} ({}d)",
                    collection.manifest.embedding_model, collection.manifest.dimensions
                ),
                query: format!("{} ({}d)", query_model, self.embedder.dimensions()),
            });
        }

        let query_embedding = self.embedder.embed(question).await?;
        let mut sources = collection.search(&query_embedding, self.retrieval.top_k);

        // A floor of 0.0 disables relevance filtering; a positive floor
        // drops weak hits and declines when nothing clears it.
        if self.retrieval.min_score > 0.0 {
            sources.retain(|s| s.score >= self.retrieval.min_score);
            if sources.is_empty() {
                return Err(AnswerError::NoRelevantContext {
                    min_score: self.retrieval.min_score,
                });
            }
        }

        debug!(
            retrieved = sources.len(),
            top_score = sources.first().map(|s| s.score).unwrap_or(0.0),
            "Retrieved context"
        );

        let messages = build_messages(question, history, &sources);
        let text = self
            .generator
            .complete(messages, self.temperature, self.max_tokens)
            .await?;

        info!(
            model = %self.generator.model_id(),
            sources = sources.len(),
            "Answered question"
        );

        Ok(Answer { text, sources })
    }
}

/// Assemble the chat transcript: system prompt carrying the retrieved
/// excerpts, prior turns in order, then the current question.
fn build_messages(question: &str, history: &[ChatTurn], sources: &[ScoredChunk]) -> Vec<Message> {
    let mut context = String::new();
    for s in sources {
        context.push_str(&format!("[page {}] {}\n\n", s.chunk.page, s.chunk.text));
    }

    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(Message {
        role: Role::System,
        content: format!("{SYSTEM_PROMPT}\n\nContext excerpts:\n\n{context}"),
    });
    for turn in history {
        messages.push(Message {
            role: Role::User,
            content: turn.question.clone(),
        });
        messages.push(Message {
            role: Role::Assistant,
            content: turn.answer.clone(),
        });
    }
    messages.push(Message {
        role: Role::User,
        content: question.to_string(),
    });

    messages
}
