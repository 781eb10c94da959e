use thiserror::Error;

/// Every failure the engine can report.
///
/// None of these are recovered from locally: they abort the operation in
/// progress and propagate to the caller.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Incompatible matrix or vector dimensions.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A builder or topology setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Bad magic number, activation tag or count in a model or dataset file.
    #[error("format error: {0}")]
    Format(String),

    /// File missing, unreadable or truncated.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Io => {
                NetworkError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
            }
            _ => NetworkError::Format(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
