use super::*;
use crate::format::column_formats;
use crate::metadata::MetaValue;
use crate::table::{Column, ColumnData};
use tempfile::tempdir;

fn sample_table() -> ColumnTable {
    ColumnTable::from_columns([
        Column::new("energy", ColumnData::Float(vec![280.0, 281.5])),
        Column::new("i0", ColumnData::Float(vec![1.1e-9, 1.2e-9])),
        Column::new("tfy", ColumnData::Int(vec![10, -200])),
    ])
    .unwrap()
}

fn sample_header() -> MetadataRecord {
    let mut md = MetadataRecord::new();
    md.insert("Facility.name", "NSLS-II");
    md.insert("Scan.id", MetaValue::Int(7));
    md.insert("Motors.manipx", MetaValue::Float(0.0));
    md
}

#[test]
fn test_render_layout() {
    let table = sample_table();
    let formats = column_formats(&table);
    let text = render_xdi(&sample_header(), "first\nsecond", &table, &formats).unwrap();

    let expected = format!(
        "# XDI/1.0 SST-1-NEXAFS/1.0\n\
         # Facility.name: NSLS-II\n\
         # Scan.id: 7\n\
         # Motors.manipx: 0.0\n\
         # ///\n\
         # first\n\
         # second\n\
         #{}\n\
         # energy i0 tfy\n\
         \x20280.000   1.1000e-09   10\n\
         \x20281.500   1.2000e-09 -200\n",
        "-".repeat(50)
    );
    assert_eq!(text, expected);
}

#[test]
fn test_empty_comment_still_emits_a_line() {
    let table = sample_table();
    let formats = column_formats(&table);
    let text = render_xdi(&MetadataRecord::new(), "", &table, &formats).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[1], "# ///");
    assert_eq!(lines[2], "# ");
    assert!(lines[3].starts_with("#---"));
}

#[test]
fn test_format_count_mismatch() {
    let table = sample_table();
    let result = render_xdi(&MetadataRecord::new(), "", &table, &[FormatSpec::Scientific]);
    assert!(matches!(
        result,
        Err(WriterError::FormatCount { formats: 1, columns: 3 })
    ));
}

#[test]
fn test_write_file_creates_directories_and_overwrites() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("proposal").join("20240425_export").join("scan_7.xdi");
    let table = sample_table();
    let formats = column_formats(&table);

    let stats = write_xdi_file(&path, &sample_header(), "", &table, &formats).unwrap();
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.columns, 3);
    assert_eq!(stats.header_entries, 3);
    let first = std::fs::read_to_string(&path).unwrap();
    assert_eq!(stats.file_size_bytes, first.len() as u64);

    let mut header = sample_header();
    header.insert("Scan.id", MetaValue::Int(8));
    write_xdi_file(&path, &header, "", &table, &formats).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert!(second.contains("# Scan.id: 8"));

    // Only the target remains; temporary files are cleaned up
    let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_failed_write_leaves_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_1.xdi");
    let table = sample_table();
    let result = write_xdi_file(&path, &sample_header(), "", &table, &[]);
    assert!(result.is_err());
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_written_file_has_default_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_1.xdi");
    let table = sample_table();
    write_xdi_file(&path, &sample_header(), "", &table, &column_formats(&table)).unwrap();

    let plain = dir.path().join("plain.txt");
    std::fs::write(&plain, b"x").unwrap();

    let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&path), mode(&plain));
}

#[cfg(unix)]
#[test]
fn test_read_only_directory_leaves_no_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let out = dir.path().join("locked");
    std::fs::create_dir(&out).unwrap();
    std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o555)).unwrap();

    // privileged users ignore directory permissions
    let writable = std::fs::File::create(out.join("canary")).is_ok();
    if !writable {
        let path = out.join("scan_1.xdi");
        let table = sample_table();
        let result = write_xdi_file(&path, &sample_header(), "", &table, &column_formats(&table));
        assert!(matches!(result, Err(WriterError::IoError(_))));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_failed_persist_removes_temp_file() {
    let dir = tempdir().unwrap();
    // a non-empty directory cannot be replaced by a file
    let path = dir.path().join("scan_1.xdi");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), b"x").unwrap();

    let table = sample_table();
    let result = write_xdi_file(&path, &sample_header(), "", &table, &column_formats(&table));
    assert!(matches!(result, Err(WriterError::PersistError(_))));

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("scan_1.xdi")]);
    assert!(path.is_dir());
}
