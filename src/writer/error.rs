/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The finished temporary file could not be moved into place
    #[error("Failed to persist output file: {0}")]
    PersistError(#[source] std::io::Error),

    /// The number of formats does not match the number of columns
    #[error("Got {formats} column formats for {columns} columns")]
    FormatCount {
        /// Number of format specifiers supplied
        formats: usize,
        /// Number of columns in the table
        columns: usize,
    },

    /// Output path has no file name
    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
