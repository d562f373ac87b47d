use thiserror::Error;

/// Configuration problems, detected up front before any document work
/// or network call happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {option}: {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },

    #[error("Unknown {what}: '{value}' (expected one of: {expected})")]
    UnknownChoice {
        what: &'static str,
        value: String,
        expected: String,
    },
}
