pub mod answer;
pub mod provider;
pub mod providers;

pub use answer::{Answer, AnswerError, Answerer, ChatTurn};
pub use provider::{Generator, LlmError, Message, Role};
pub use providers::create_generator;
