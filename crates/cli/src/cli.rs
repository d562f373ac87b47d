use std::path::PathBuf;

use clap::Parser;

use pdfchat_core::Config;

/// Terminal chatbot for asking questions about a document.
///
/// Ingests the document into a persisted vector collection (reused across
/// runs while the document is unchanged), then answers questions against it
/// in an interactive REPL.
#[derive(Parser, Debug)]
#[command(name = "pdfchat", about = "Ask questions about a PDF or text document")]
pub struct CliArgs {
    /// Path to the document to chat with (.pdf or .txt)
    pub document: PathBuf,

    /// Discard any persisted collection and re-embed before starting
    #[arg(long)]
    pub rebuild: bool,

    /// Ask a single question and exit instead of starting the REPL
    #[arg(long, short = 'q')]
    pub question: Option<String>,

    /// Chunk window size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// How many chunks to retrieve per question
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Generation model override
    #[arg(long)]
    pub model: Option<String>,

    /// Root directory for persisted collections
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Fold command-line overrides into the env-derived config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(chunk_size) = self.chunk_size {
            config.chunking.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = self.chunk_overlap {
            config.chunking.chunk_overlap = chunk_overlap;
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(ref model) = self.model {
            match config.llm.provider.as_str() {
                "ollama" => config.llm.ollama_model = model.clone(),
                _ => config.llm.openai_model = model.clone(),
            }
        }
        if let Some(ref data_dir) = self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
    }
}
