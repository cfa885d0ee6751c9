use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SimpleError {
    #[error("Unknown option: -{0}")]
    UnknownOption(char),

    #[error("Unknown or ambiguous option: {0}")]
    UnknownLongOption(String),

    /// Carries the option as written, `-o` or `--output`.
    #[error("Missing value for option: {0}")]
    MissingValue(String),

    #[error("Invalid size value: {0}")]
    InvalidSize(String),

    #[error("Unexpected parse result: {0}")]
    Unexpected(i32),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SimpleError>;
