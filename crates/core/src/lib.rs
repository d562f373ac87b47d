pub mod chunk;
pub mod config;
pub mod error;

pub use chunk::{Chunk, ScoredChunk};
pub use config::Config;
pub use error::*;
