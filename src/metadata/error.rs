/// Errors that can occur while building run metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A field every start record must carry is absent or mistyped
    #[error("Start record is missing required field: {0}")]
    MissingStartField(&'static str),

    /// The start time cannot be represented as a calendar date
    #[error("Invalid start timestamp: {0}")]
    InvalidTimestamp(f64),
}
