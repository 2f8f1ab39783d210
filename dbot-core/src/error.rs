use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Database error: {0}")]
    Database(String),

    /// Outbound transport failure (send, reply, edit).
    #[error("Bot error: {0}")]
    Bot(String),

    /// Live fetch of a message from the platform failed.
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DbotError>;
