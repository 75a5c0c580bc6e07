//! Catalog input and output store tests.

use std::{fs, path::PathBuf};

use framegrid::{
    CatalogEntry, FramegridError, OutputEncoding, read_catalog, read_entries, write_entries,
};

fn entry(id: &str, name: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
        image: format!("videos/{name}_preview.jpg"),
    }
}

// ── Reading catalogs ───────────────────────────────────────────────

#[test]
fn csv_paths_in_row_order() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let catalog = directory.path().join("videos.csv");
    fs::write(
        &catalog,
        "title,filepath\nfirst,videos/a.mp4\nblank,\nsecond, videos/b.mkv \nthird,c.avi\n",
    )
    .unwrap();

    let paths = read_catalog(&catalog).unwrap();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("videos/a.mp4"),
            PathBuf::from("videos/b.mkv"),
            PathBuf::from("c.avi"),
        ]
    );
}

#[test]
fn csv_with_only_a_header_is_empty() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let catalog = directory.path().join("empty.csv");
    fs::write(&catalog, "filepath\n").unwrap();

    assert!(read_catalog(&catalog).unwrap().is_empty());
}

#[test]
fn missing_filepath_column() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let catalog = directory.path().join("videos.csv");
    fs::write(&catalog, "path,name\na.mp4,a\n").unwrap();

    let result = read_catalog(&catalog);
    assert!(matches!(result, Err(FramegridError::MissingColumn(column)) if column == "filepath"));
}

#[test]
fn missing_catalog_file() {
    let result = read_catalog("no/such/catalog.xlsx");
    assert!(matches!(result, Err(FramegridError::InputCatalogNotFound(_))));
}

#[test]
fn unsupported_extension() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let catalog = directory.path().join("videos.txt");
    fs::write(&catalog, "filepath\na.mp4\n").unwrap();

    assert!(matches!(
        read_catalog(&catalog),
        Err(FramegridError::UnsupportedCatalogFormat(_))
    ));
}

#[test]
fn spreadsheet_paths_in_row_order() {
    // First sheet: a " filepath " header, a blank row, a padded path, a
    // numeric cell and a row with no path at all.
    let paths = read_catalog("tests/fixtures/videos.xlsx").unwrap();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("videos/a.mp4"),
            PathBuf::from("videos/b.mkv"),
            PathBuf::from("42"),
        ]
    );
}

#[test]
fn corrupt_spreadsheet_is_a_parse_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let catalog = directory.path().join("videos.xlsx");
    fs::write(&catalog, b"this is not a workbook").unwrap();

    assert!(matches!(
        read_catalog(&catalog),
        Err(FramegridError::CatalogParseError(_))
    ));
}

// ── Output store ───────────────────────────────────────────────────

#[test]
fn document_encoding_round_trip() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("output.json");
    let entries = vec![entry("1", "a"), entry("2", "b")];

    write_entries(&output, &entries, OutputEncoding::Document).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap())
        .expect("Document output should be plain JSON");
    assert!(value.is_array());
    assert_eq!(value[1]["name"], "b");
    assert_eq!(read_entries(&output).unwrap(), entries);
}

#[test]
fn double_encoding_is_a_json_string() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("output.json");
    let entries = vec![entry("1", "a")];

    write_entries(&output, &entries, OutputEncoding::DoubleEncoded).unwrap();

    let contents = fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with('"'));
    let inner: String = serde_json::from_str(&contents).unwrap();
    assert!(inner.contains("\n    {\n        \"id\": \"1\""));
    assert_eq!(read_entries(&output).unwrap(), entries);
}

#[test]
fn empty_entry_list_is_still_written() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("output.json");

    write_entries(&output, &[], OutputEncoding::Document).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "[]");
    assert!(read_entries(&output).unwrap().is_empty());
}

#[test]
fn unwritable_output_is_an_io_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("missing_dir").join("output.json");

    assert!(matches!(
        write_entries(&output, &[], OutputEncoding::Document),
        Err(FramegridError::IoError(_))
    ));
}
