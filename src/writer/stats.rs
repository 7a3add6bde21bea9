use std::fmt;
use std::path::PathBuf;

/// Statistics from a completed write operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterStats {
    /// File that was written
    pub path: PathBuf,
    /// Number of header entries written
    pub header_entries: usize,
    /// Number of data columns
    pub columns: usize,
    /// Number of data rows
    pub rows: usize,
    /// Total file size in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows x {} columns ({} header entries, {} bytes) to {}",
            self.rows,
            self.columns,
            self.header_entries,
            self.file_size_bytes,
            self.path.display()
        )
    }
}
