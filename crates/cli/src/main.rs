mod cli;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use pdfchat_core::config::load_dotenv;
use pdfchat_core::Config;
use pdfchat_ingest::{create_embedder, IngestPipeline};
use pdfchat_llm::{create_generator, Answerer, ChatTurn};
use pdfchat_store::VectorStore;

use crate::cli::CliArgs;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    // Config comes from the environment; command-line flags override.
    load_dotenv();
    let mut config = Config::from_env();
    args.apply_to(&mut config);
    config.validate().context("invalid configuration")?;
    config.log_summary();

    // Wire up the components. Credential problems surface here, before the
    // document is read or any request goes out.
    let embedder = create_embedder(&config.embedding).context("failed to create embedder")?;
    let generator = create_generator(&config.llm).context("failed to create LLM provider")?;
    let store =
        VectorStore::open(&config.storage.data_dir).context("failed to open collection store")?;
    let pipeline = IngestPipeline::new(
        config.chunking.clone(),
        config.embedding.batch_size,
        embedder.clone(),
        store,
    )
    .context("failed to create ingest pipeline")?;
    let answerer = Answerer::new(
        embedder,
        generator,
        config.retrieval.clone(),
        config.llm.temperature,
        config.llm.max_tokens,
    );

    // Build or reuse the document's collection.
    terminal.print_info(&format!("Ingesting {}...", args.document.display()))?;
    let mut handle = if args.rebuild {
        pipeline.rebuild(&args.document).await
    } else {
        pipeline.build_or_load(&args.document).await
    }
    .context("ingestion failed")?;
    let chunk_count = handle.collection().map(|c| c.len()).unwrap_or(0);

    // One-shot mode: ask, print, leave.
    if let Some(ref question) = args.question {
        let answer = answerer.answer(question, &[], &handle).await?;
        terminal.print_answer(&answer.text)?;
        terminal.print_sources(&answer.sources)?;
        return Ok(());
    }

    let document_name = args
        .document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.document.display().to_string());
    terminal.print_banner(&document_name, chunk_count, &answerer.model_id())?;

    let mut history: Vec<ChatTurn> = Vec::new();
    let mut show_sources = true;

    // REPL loop
    loop {
        let input = match terminal.read_input()? {
            Some(text) => text,
            None => {
                terminal.print_info("Goodbye.")?;
                break;
            }
        };

        if input.is_empty() {
            continue;
        }

        match input.as_str() {
            "/help" => {
                terminal.print_help()?;
                continue;
            }
            "/sources" => {
                show_sources = !show_sources;
                terminal.print_info(if show_sources {
                    "Source listing on."
                } else {
                    "Source listing off."
                })?;
                continue;
            }
            "/clear" => {
                history.clear();
                terminal.print_info("Conversation cleared.")?;
                continue;
            }
            "/reload" => {
                terminal.print_info("Re-ingesting document...")?;
                match pipeline.rebuild(&args.document).await {
                    Ok(new_handle) => {
                        let chunks = new_handle.collection().map(|c| c.len()).unwrap_or(0);
                        handle = new_handle;
                        history.clear();
                        terminal.print_info(&format!("Rebuilt collection ({} chunks).", chunks))?;
                    }
                    Err(e) => {
                        error!(error = %e, "Reload failed");
                        terminal.print_error(&e.to_string())?;
                    }
                }
                continue;
            }
            other if other.starts_with('/') => {
                terminal.print_error(&format!("unknown command: {} (try /help)", other))?;
                continue;
            }
            _ => {}
        }

        // Answer the question; failures are reported and the session lives on.
        match answerer.answer(&input, &history, &handle).await {
            Ok(answer) => {
                terminal.print_answer(&answer.text)?;
                if show_sources {
                    terminal.print_sources(&answer.sources)?;
                }
                history.push(ChatTurn {
                    question: input,
                    answer: answer.text,
                });
            }
            Err(e) => {
                error!(error = %e, "Answer failed");
                terminal.print_error(&e.to_string())?;
            }
        }
    }

    Ok(())
}
