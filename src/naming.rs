//! Output file naming.
//!
//! Names are built from the header as
//! `[<sample>_][<element>_]scan_<scan id>.xdi` and sanitized so any sample
//! name typed at the beamline yields a single, portable path component.

use std::path::{Path, PathBuf};

use crate::metadata::MetadataRecord;

/// Extension of every exported file
pub const XDI_EXTENSION: &str = "xdi";

/// Characters removed from file names
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Unsanitized file name for a header
pub fn xdi_file_name(metadata: &MetadataRecord) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    for key in ["Sample.name", "Element.symbol"] {
        if let Some(value) = metadata.get(key) {
            let value = value.to_string();
            if !value.is_empty() {
                parts.push(value);
            }
        }
    }
    parts.push("scan".to_string());
    parts.push(
        metadata
            .get("Scan.id")
            .map(|v| v.to_string())
            .unwrap_or_default(),
    );
    format!("{}.{}", parts.join("_"), XDI_EXTENSION)
}

/// Make a file name safe on common filesystems.
///
/// Path separators, reserved punctuation and control characters are dropped,
/// whitespace becomes `_`, and leading dots or underscores and trailing dots
/// are trimmed.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .collect();
    let trimmed = cleaned.trim_end_matches('.');
    let trimmed = trimmed.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Full output path: the caller's directory plus the sanitized file name
pub fn output_path(dir: &Path, metadata: &MetadataRecord) -> PathBuf {
    dir.join(sanitize_file_name(&xdi_file_name(metadata)))
}
