//! Integration tests for retrieval-augmented answering, using fake
//! embedding and generation backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use pdfchat_core::config::RetrievalConfig;
use pdfchat_core::Chunk;
use pdfchat_ingest::{Embedder, EmbeddingError};
use pdfchat_llm::{Answerer, AnswerError, ChatTurn, Generator, LlmError, Message, Role};
use pdfchat_store::{CollectionHandle, CollectionManifest, EmbeddedChunk, VectorCollection, VectorStore};

const MODEL: &str = "fake/embedder-v1";
const DIMS: usize = 4;

/// Embedder that answers every query with one fixed vector.
#[derive(Debug)]
struct FixedEmbedder {
    vector: Vec<f32>,
    model: String,
}

impl FixedEmbedder {
    fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            model: MODEL.to_string(),
        }
    }

    fn with_model(vector: Vec<f32>, model: &str) -> Self {
        Self {
            vector,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}

/// Generator that returns a canned reply and records what it was asked.
#[derive(Debug)]
struct RecordingGenerator {
    reply: String,
    seen: Arc<Mutex<Vec<Message>>>,
}

impl RecordingGenerator {
    fn new(reply: &str) -> (Self, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: reply.to_string(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        *self.seen.lock().unwrap() = messages;
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> String {
        "fake-chat".to_string()
    }
}

/// A ready handle over four chunks embedded on the unit axes.
fn ready_handle(dir: &TempDir) -> CollectionHandle {
    let vectors = vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
    ];
    handle_with_vectors(dir, vectors, MODEL)
}

fn handle_with_vectors(dir: &TempDir, vectors: Vec<Vec<f32>>, model: &str) -> CollectionHandle {
    let doc = dir.path().join("report.pdf");
    std::fs::write(&doc, b"stand-in").unwrap();

    let chunks: Vec<EmbeddedChunk> = vectors
        .into_iter()
        .enumerate()
        .map(|(i, embedding)| EmbeddedChunk {
            chunk: Chunk {
                index: i,
                text: format!("chunk {i} talks about subject {i}"),
                page: i + 1,
                char_offset: i * 800,
            },
            embedding,
        })
        .collect();

    let collection = VectorCollection {
        manifest: CollectionManifest::new(
            doc.clone(),
            "sig".to_string(),
            model.to_string(),
            DIMS,
            1000,
            200,
            chunks.len(),
        ),
        chunks,
    };

    let store = VectorStore::open(dir.path().join("data")).unwrap();
    store.handle(&doc).with_data(Arc::new(collection))
}

fn unready_handle(dir: &TempDir) -> CollectionHandle {
    let doc = dir.path().join("report.pdf");
    std::fs::write(&doc, b"stand-in").unwrap();
    let store = VectorStore::open(dir.path().join("data")).unwrap();
    store.handle(&doc)
}

fn retrieval(top_k: usize, min_score: f32) -> RetrievalConfig {
    RetrievalConfig { top_k, min_score }
}

fn make_answerer(embedder: FixedEmbedder, generator: RecordingGenerator, config: RetrievalConfig) -> Answerer {
    Answerer::new(Arc::new(embedder), Box::new(generator), config, 0.7, 1024)
}

#[tokio::test]
async fn unready_handle_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("unused");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(3, 0.0),
    );

    let err = answerer
        .answer("what is this?", &[], &unready_handle(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerError::CollectionNotReady));
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("unused");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(3, 0.0),
    );

    let err = answerer
        .answer("   ", &[], &ready_handle(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerError::EmptyQuestion));
}

#[tokio::test]
async fn answer_text_is_the_generator_output_verbatim() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("Revenue grew 12% year over year.");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(3, 0.0),
    );

    let answer = answerer
        .answer("How did revenue do?", &[], &ready_handle(&dir))
        .await
        .unwrap();

    assert_eq!(answer.text, "Revenue grew 12% year over year.");
    assert_eq!(answer.sources.len(), 3);
}

#[tokio::test]
async fn sources_are_descending_with_ties_in_chunk_order() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("ok");
    // Query along axis 2: chunk 2 scores 1.0, every other chunk 0.0.
    let answerer = make_answerer(
        FixedEmbedder::new(vec![0.0, 0.0, 1.0, 0.0]),
        generator,
        retrieval(3, 0.0),
    );

    let answer = answerer
        .answer("anything", &[], &ready_handle(&dir))
        .await
        .unwrap();

    let indices: Vec<usize> = answer.sources.iter().map(|s| s.chunk.index).collect();
    assert_eq!(indices, vec![2, 0, 1]);
    assert!(answer.sources[0].score > answer.sources[1].score);
    assert_eq!(answer.sources[1].score, answer.sources[2].score);
}

#[tokio::test]
async fn never_returns_more_than_k_sources() {
    let dir = TempDir::new().unwrap();

    let (generator, _) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(2, 0.0),
    );
    let answer = answerer.answer("q", &[], &ready_handle(&dir)).await.unwrap();
    assert_eq!(answer.sources.len(), 2);

    // k larger than the collection returns everything there is.
    let (generator, _) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(10, 0.0),
    );
    let answer = answerer.answer("q", &[], &ready_handle(&dir)).await.unwrap();
    assert_eq!(answer.sources.len(), 4);
}

#[tokio::test]
async fn prompt_carries_context_and_ends_with_the_question() {
    let dir = TempDir::new().unwrap();
    let (generator, seen) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(2, 0.0),
    );

    answerer
        .answer("What about subject 0?", &[], &ready_handle(&dir))
        .await
        .unwrap();

    let messages = seen.lock().unwrap().clone();
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("chunk 0 talks about subject 0"));
    assert!(messages[0].content.contains("[page 1]"));

    let last = messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, "What about subject 0?");
}

#[tokio::test]
async fn history_turns_are_replayed_between_system_and_question() {
    let dir = TempDir::new().unwrap();
    let (generator, seen) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(2, 0.0),
    );

    let history = vec![ChatTurn {
        question: "What is chapter one about?".to_string(),
        answer: "It introduces the dataset.".to_string(),
    }];
    answerer
        .answer("And chapter two?", &history, &ready_handle(&dir))
        .await
        .unwrap();

    let messages = seen.lock().unwrap().clone();
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
    assert_eq!(messages[1].content, "What is chapter one about?");
    assert_eq!(messages[2].content, "It introduces the dataset.");
}

#[tokio::test]
async fn mismatched_embedding_space_is_rejected_without_generating() {
    let dir = TempDir::new().unwrap();
    let (generator, seen) = RecordingGenerator::new("unused");
    let answerer = make_answerer(
        FixedEmbedder::with_model(vec![1.0, 0.0, 0.0, 0.0], "fake/embedder-v2"),
        generator,
        retrieval(3, 0.0),
    );

    let err = answerer
        .answer("q", &[], &ready_handle(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerError::EmbeddingSpaceMismatch { .. }));
    assert!(seen.lock().unwrap().is_empty(), "generator must not be called");
}

#[tokio::test]
async fn relevance_floor_declines_when_nothing_clears_it() {
    let dir = TempDir::new().unwrap();
    let (generator, seen) = RecordingGenerator::new("unused");
    // Orthogonal to every stored vector: all similarities are 0.0.
    let answerer = make_answerer(
        FixedEmbedder::new(vec![0.5, -0.5, 0.5, -0.5]),
        generator,
        retrieval(3, 0.9),
    );

    let vectors = vec![
        vec![1.0, 1.0, 1.0, 1.0],
        vec![1.0, 1.0, -1.0, -1.0],
    ];
    let handle = handle_with_vectors(&dir, vectors, MODEL);

    let err = answerer.answer("q", &[], &handle).await.unwrap_err();

    assert!(matches!(err, AnswerError::NoRelevantContext { .. }));
    assert!(seen.lock().unwrap().is_empty(), "generator must not be called");
}

#[tokio::test]
async fn disabled_floor_returns_weak_matches_instead_of_declining() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![0.5, -0.5, 0.5, -0.5]),
        generator,
        retrieval(3, 0.0),
    );

    let vectors = vec![
        vec![1.0, 1.0, 1.0, 1.0],
        vec![1.0, 1.0, -1.0, -1.0],
    ];
    let handle = handle_with_vectors(&dir, vectors, MODEL);

    let answer = answerer.answer("q", &[], &handle).await.unwrap();
    assert_eq!(answer.sources.len(), 2);
}

#[tokio::test]
async fn positive_floor_keeps_only_clearing_chunks() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(4, 0.5),
    );

    let answer = answerer
        .answer("q", &[], &ready_handle(&dir))
        .await
        .unwrap();

    // Only the axis-aligned chunk scores 1.0; the rest sit at 0.0.
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].chunk.index, 0);
}

#[tokio::test]
async fn empty_collection_counts_as_not_ready() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = RecordingGenerator::new("unused");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(3, 0.0),
    );

    let handle = handle_with_vectors(&dir, Vec::new(), MODEL);
    let err = answerer.answer("q", &[], &handle).await.unwrap_err();
    assert!(matches!(err, AnswerError::CollectionNotReady));
}

#[tokio::test]
async fn question_whitespace_is_trimmed_before_prompting() {
    let dir = TempDir::new().unwrap();
    let (generator, seen) = RecordingGenerator::new("ok");
    let answerer = make_answerer(
        FixedEmbedder::new(vec![1.0, 0.0, 0.0, 0.0]),
        generator,
        retrieval(2, 0.0),
    );

    answerer
        .answer("  padded question  \n", &[], &ready_handle(&dir))
        .await
        .unwrap();

    let messages = seen.lock().unwrap().clone();
    assert_eq!(messages.last().unwrap().content, "padded question");
}
