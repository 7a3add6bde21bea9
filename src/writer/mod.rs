//! # XDI Writer Module
//!
//! Serializes a metadata header and a formatted numeric table to the
//! XAS Data Interchange (XDI) ASCII layout used by the beamline:
//!
//! ```text
//! # XDI/1.0 SST-1-NEXAFS/1.0
//! # Facility.name: NSLS-II
//! # ...one line per header entry, in insertion order...
//! # ///
//! # <comment line 1>
//! # <comment line 2>
//! #--------------------------------------------------
//! # energy seconds i0 itrans
//!  280.000   1.5000e+00   1.1000e-09   2.0000e-10
//! ```
//!
//! ## Design Principles
//!
//! 1. **All-or-nothing files**: the document is written to a temporary file
//!    next to the target and moved into place only once complete, so a failed
//!    export never leaves a truncated file behind.
//!
//!    The staged file is created with the default `0o666 & !umask` mode, so
//!    exported files have the same permissions as any other file the process
//!    creates.
//!
//! 2. **Silent overwrite**: an existing file with the same name is replaced.
//!
//! 3. **Deterministic bytes**: the same header, table and formats always
//!    produce the same output.

mod error;
mod stats;

#[cfg(test)]
mod tests;

pub use error::WriterError;
pub use stats::WriterStats;

use log::debug;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::Builder;

use crate::format::FormatSpec;
use crate::metadata::MetadataRecord;
use crate::table::ColumnTable;

/// First line of every file
pub const XDI_VERSION_LINE: &str = "# XDI/1.0 SST-1-NEXAFS/1.0";

/// Line closing the metadata block
pub const HEADER_SEPARATOR: &str = "# ///";

/// Number of dashes in the rule above the column names
pub const RULE_WIDTH: usize = 50;

/// Write the header block: version, metadata, comment, rule and column names
pub fn write_header<W: Write>(
    out: &mut W,
    metadata: &MetadataRecord,
    comment: &str,
    columns: &[&str],
) -> std::io::Result<()> {
    writeln!(out, "{}", XDI_VERSION_LINE)?;
    for (key, value) in metadata.iter() {
        writeln!(out, "# {}: {}", key, value)?;
    }
    writeln!(out, "{}", HEADER_SEPARATOR)?;
    for line in comment.split('\n') {
        writeln!(out, "# {}", line)?;
    }
    writeln!(out, "#{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "# {}", columns.join(" "))
}

/// Write the numeric block, one space-delimited row per timepoint
pub fn write_data<W: Write>(
    out: &mut W,
    table: &ColumnTable,
    formats: &[FormatSpec],
) -> Result<(), WriterError> {
    check_formats(table, formats)?;
    let mut line = String::new();
    for row in 0..table.n_rows() {
        line.clear();
        for (i, (column, spec)) in table.iter().zip(formats).enumerate() {
            if i > 0 {
                line.push(' ');
            }
            if let Some(cell) = spec.render_cell(&column.data, row) {
                line.push_str(&cell);
            }
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// Write a complete XDI document
pub fn write_xdi<W: Write>(
    out: &mut W,
    metadata: &MetadataRecord,
    comment: &str,
    table: &ColumnTable,
    formats: &[FormatSpec],
) -> Result<(), WriterError> {
    check_formats(table, formats)?;
    write_header(out, metadata, comment, &table.names())?;
    write_data(out, table, formats)
}

/// Render a complete XDI document to a string
pub fn render_xdi(
    metadata: &MetadataRecord,
    comment: &str,
    table: &ColumnTable,
    formats: &[FormatSpec],
) -> Result<String, WriterError> {
    let mut buffer = Vec::new();
    write_xdi(&mut buffer, metadata, comment, table, formats)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write an XDI file at `path`, creating its directory if needed.
///
/// The file appears at `path` only after every byte has been written.
pub fn write_xdi_file(
    path: &Path,
    metadata: &MetadataRecord,
    comment: &str,
    table: &ColumnTable,
    formats: &[FormatSpec],
) -> Result<WriterStats, WriterError> {
    check_formats(table, formats)?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if path.file_name().is_none() {
        return Err(WriterError::InvalidPath(path.display().to_string()));
    }
    fs::create_dir_all(dir)?;

    let mut temp = staging_builder().tempfile_in(dir)?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        write_xdi(&mut out, metadata, comment, table, formats)?;
        out.flush()?;
    }
    let file = temp
        .persist(path)
        .map_err(|e| WriterError::PersistError(e.error))?;
    let file_size_bytes = file.metadata()?.len();
    debug!("Persisted {} ({} bytes)", path.display(), file_size_bytes);

    Ok(WriterStats {
        path: path.to_path_buf(),
        header_entries: metadata.len(),
        columns: table.len(),
        rows: table.n_rows(),
        file_size_bytes,
    })
}

/// Temporary files get the mode a plain `File::create` would, so the
/// persisted file is readable under the process umask like any other output.
fn staging_builder() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder
}

fn check_formats(table: &ColumnTable, formats: &[FormatSpec]) -> Result<(), WriterError> {
    if formats.len() != table.len() {
        return Err(WriterError::FormatCount {
            formats: formats.len(),
            columns: table.len(),
        });
    }
    Ok(())
}
