/// Errors that can occur while loading runs from a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error reading a run document
    #[error("Failed to read run document: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed run document
    #[error("Invalid run document: {0}")]
    JsonError(#[from] serde_json::Error),

    /// No run with this uid
    #[error("Run not found: {0}")]
    NotFound(String),

    /// The uid cannot name a catalog entry
    #[error("Invalid run uid: {0}")]
    InvalidUid(String),

    /// Catalog root is missing or not a directory
    #[error("Catalog root is not a directory: {0}")]
    NotADirectory(String),

    /// A channel holds no data
    #[error("Channel '{channel}' in stream '{stream}' has no data")]
    EmptyChannel {
        /// Stream holding the channel
        stream: String,
        /// Channel name
        channel: String,
    },

    /// The run cannot be read as a unit
    #[error("Unreadable run: {0}")]
    InvalidRun(String),
}
