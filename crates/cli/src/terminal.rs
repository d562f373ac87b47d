use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use pdfchat_core::ScoredChunk;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ANSWER: Color = Color::Cyan;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// How many characters of each source chunk to show in the source listing.
const SOURCE_PREVIEW_CHARS: usize = 120;

/// Manages terminal I/O for the interactive REPL.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, document: &str, chunks: usize, model: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("pdfchat"),
            ResetColor,
            Print(" - chat with your document\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "Document: {} ({} chunks) | Model: {}\n",
                document, chunks, model
            )),
            Print("Ask a question, or /help for commands.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt.
    /// Returns None if the user wants to exit.
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("you> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF (piped input ran out, or Ctrl+D)
            return Ok(None);
        }
        let trimmed = input.trim().to_string();

        if trimmed == "exit" || trimmed == "quit" || trimmed == "/exit" || trimmed == "/quit" {
            return Ok(None);
        }

        Ok(Some(trimmed))
    }

    /// Print the generated answer.
    pub fn print_answer(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ANSWER),
            Print(text),
            ResetColor,
            Print("\n"),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the source chunks an answer was grounded on.
    pub fn print_sources(&self, sources: &[ScoredChunk]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print("Sources:\n"),
        )?;
        for s in sources {
            let preview: String = s.chunk.text.chars().take(SOURCE_PREVIEW_CHARS).collect();
            let ellipsis = if s.chunk.text.chars().count() > SOURCE_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            execute!(
                stdout,
                Print(format!(
                    "  [page {}, score {:.3}] {}{}\n",
                    s.chunk.page,
                    s.score,
                    preview.replace('\n', " "),
                    ellipsis
                )),
            )?;
        }
        execute!(stdout, ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the REPL command reference.
    pub fn print_help(&self) -> Result<()> {
        self.print_info(
            "Commands:\n  \
             /sources   toggle the source listing after answers\n  \
             /reload    re-ingest the document from scratch\n  \
             /clear     forget the conversation so far\n  \
             /help      show this help\n  \
             /quit      leave (also: exit, quit, Ctrl+D)",
        )
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
