//! Catalog input and output.
//!
//! The input catalog is a table with a `filepath` column, either a CSV file
//! or the first sheet of a spreadsheet workbook. The output store is a JSON
//! file holding the list of [`CatalogEntry`] records.
//!
//! ```no_run
//! use framegrid::{OutputEncoding, read_catalog, write_entries};
//!
//! let videos = read_catalog("videos.xlsx")?;
//! println!("{} videos listed", videos.len());
//! write_entries("output.json", &[], OutputEncoding::Document)?;
//! # Ok::<(), framegrid::FramegridError>(())
//! ```

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use calamine::{Data, Reader, open_workbook_auto};
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};

use crate::{configuration::OutputEncoding, entry::CatalogEntry, error::FramegridError};

/// Header of the column holding video paths.
pub const FILEPATH_COLUMN: &str = "filepath";

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the video paths listed in a catalog, in row order.
///
/// `.csv` files are read with the `csv` crate; spreadsheet formats
/// (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) use the first sheet. The first
/// row is the header. Empty cells are skipped.
///
/// # Errors
///
/// [`FramegridError::InputCatalogNotFound`] if the file does not exist,
/// [`FramegridError::UnsupportedCatalogFormat`] for any other extension,
/// [`FramegridError::MissingColumn`] if no header is `filepath`, and
/// [`FramegridError::CatalogParseError`] for malformed files.
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, FramegridError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FramegridError::InputCatalogNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let paths = if extension == "csv" {
        read_csv(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet(path)?
    } else {
        return Err(FramegridError::UnsupportedCatalogFormat(path.to_path_buf()));
    };

    log::info!("Read {} video paths from {}", paths.len(), path.display());
    Ok(paths)
}

fn read_csv(path: &Path) -> Result<Vec<PathBuf>, FramegridError> {
    let mut reader = csv::Reader::from_path(path)?;
    let column = column_index(reader.headers()?.iter())?;

    let mut paths = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(column).map(str::trim) {
            Some(value) if !value.is_empty() => paths.push(PathBuf::from(value)),
            _ => {}
        }
    }
    Ok(paths)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<PathBuf>, FramegridError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        FramegridError::CatalogParseError("workbook has no sheets".to_string())
    })??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| FramegridError::MissingColumn(FILEPATH_COLUMN.to_string()))?;
    let column = column_index(header.iter().map(cell_text))?;

    let mut paths = Vec::new();
    for row in rows {
        match row.get(column).map(cell_text) {
            Some(value) if !value.is_empty() => paths.push(PathBuf::from(value)),
            _ => {}
        }
    }
    Ok(paths)
}

fn column_index<I, S>(headers: I) -> Result<usize, FramegridError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .position(|header| header.as_ref().trim() == FILEPATH_COLUMN)
        .ok_or_else(|| FramegridError::MissingColumn(FILEPATH_COLUMN.to_string()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

/// Write the entry list to `path`.
///
/// The file is written even when `entries` is empty.
pub fn write_entries<P: AsRef<Path>>(
    path: P,
    entries: &[CatalogEntry],
    encoding: OutputEncoding,
) -> Result<(), FramegridError> {
    let path = path.as_ref();
    let payload = encode_entries(entries, encoding)?;

    let mut file = fs::File::create(path)?;
    file.write_all(&payload)?;
    file.flush()?;

    log::info!(
        "Wrote {} catalog entries to {} ({encoding:?})",
        entries.len(),
        path.display()
    );
    Ok(())
}

fn encode_entries(
    entries: &[CatalogEntry],
    encoding: OutputEncoding,
) -> Result<Vec<u8>, FramegridError> {
    match encoding {
        OutputEncoding::Document => Ok(serde_json::to_vec_pretty(entries)?),
        OutputEncoding::DoubleEncoded => {
            let mut inner = Vec::new();
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut inner, formatter);
            entries.serialize(&mut serializer)?;
            let text = escape_non_ascii(&String::from_utf8_lossy(&inner));
            Ok(serde_json::to_vec(&text)?)
        }
    }
}

/// Replace every non-ASCII character of a JSON text with `\uXXXX` escapes
/// (surrogate pairs above the BMP), so legacy output is pure ASCII.
///
/// Outside string literals JSON is ASCII, so this never touches structure.
fn escape_non_ascii(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for character in text.chars() {
        if character.is_ascii() {
            escaped.push(character);
            continue;
        }
        for unit in character.encode_utf16(&mut units) {
            escaped.push_str(&format!("\\u{unit:04x}"));
        }
    }
    escaped
}

/// Read an output store back, accepting either [`OutputEncoding`].
pub fn read_entries<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>, FramegridError> {
    let contents = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::String(inner) => Ok(serde_json::from_str(&inner)?),
        value => Ok(serde_json::from_value(value)?),
    }
}
