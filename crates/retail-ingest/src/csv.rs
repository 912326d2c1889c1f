//! CSV reading into all-string DataFrames.
//!
//! Schema inference is disabled: every column arrives as text and the
//! cleaners decide what each value means.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses CSV bytes with a single header row.
///
/// `origin` names the source in error messages.
pub fn read_csv_bytes(bytes: Vec<u8>, origin: &str) -> Result<DataFrame> {
    let bytes = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::CsvParse {
            origin: origin.to_string(),
            message: "no header row".to_string(),
        });
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| IngestError::CsvParse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
}

/// Reads a CSV file from disk.
pub fn read_csv_file(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_bytes(bytes, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn every_column_is_text() {
        let df = read_csv_bytes(
            b"index,staff_numbers,latitude\n0,325,51.5\n1,J78,\n".to_vec(),
            "inline",
        )
        .unwrap();
        assert_eq!(df.shape(), (2, 3));
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFcountry,country_code\nGermany,DE\n")
            .unwrap();
        let df = read_csv_file(file.path()).unwrap();
        assert!(df.column("country").is_ok());
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = read_csv_bytes(b"  \n".to_vec(), "inline").unwrap_err();
        assert!(matches!(err, IngestError::CsvParse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_csv_file(Path::new("/nonexistent/products.csv")).unwrap_err();
        assert!(err.to_string().contains("products.csv"));
    }
}
