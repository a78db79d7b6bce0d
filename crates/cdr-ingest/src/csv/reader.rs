//! CSV file reading with delimiter sniffing.
//!
//! Every column is loaded as a string. Typing happens later, once, through
//! the date and number parsers, so one odd cell never fails a whole column.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result};

use super::header::{parse_header_line, sniff_delimiter};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A loaded CSV export.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub frame: DataFrame,
    /// Header fields as they appear in the file (trimmed).
    pub headers: Vec<String>,
    pub delimiter: u8,
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Rejects UTF-16 input and strips a UTF-8 BOM.
pub fn validate_encoding(path: &Path, bytes: &[u8]) -> Result<usize> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 BE",
        });
    }
    if bytes.starts_with(UTF8_BOM) {
        Ok(UTF8_BOM.len())
    } else {
        Ok(0)
    }
}

/// Byte offset just past the first `lines` line breaks.
fn skip_lines(bytes: &[u8], lines: usize) -> usize {
    if lines == 0 {
        return 0;
    }
    bytes
        .iter()
        .enumerate()
        .filter(|(_, byte)| **byte == b'\n')
        .nth(lines - 1)
        .map_or(bytes.len(), |(idx, _)| idx + 1)
}

/// Reads a CSV file into a string-typed DataFrame.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    read_csv_table_skipping(path, 0)
}

/// Like [`read_csv_table`] for exports whose header sits below
/// `preamble_rows` title lines.
pub fn read_csv_table_skipping(path: &Path, preamble_rows: usize) -> Result<CsvTable> {
    let mut bytes = read_bytes(path)?;
    let bom_len = validate_encoding(path, &bytes)?;
    bytes.drain(..bom_len);
    let preamble = skip_lines(&bytes, preamble_rows);
    bytes.drain(..preamble);

    let header_line = String::from_utf8_lossy(&bytes)
        .lines()
        .next()
        .map(str::to_string)
        .unwrap_or_default();
    if header_line.trim().is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let delimiter = sniff_delimiter(&header_line);
    let headers = parse_header_line(&header_line, delimiter);

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(delimiter)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_truncate_ragged_lines(true)
        })
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(
        path = %path.display(),
        preamble_rows,
        rows = frame.height(),
        columns = frame.width(),
        delimiter = %char::from(delimiter).escape_default(),
        "loaded CSV"
    );

    Ok(CsvTable {
        frame,
        headers,
        delimiter,
    })
}

/// Reads a CSV file and returns only the frame.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    read_csv_table(path).map(|table| table.frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_reads_all_columns_as_strings() {
        let file = create_temp_csv(b"Release Number,Piece\n2001,620\n2002,\n");
        let table = read_csv_table(file.path()).unwrap();

        assert_eq!(table.headers, vec!["Release Number", "Piece"]);
        assert_eq!(table.frame.height(), 2);
        let piece = table.frame.column("Piece").unwrap();
        assert_eq!(piece.dtype(), &DataType::String);
        assert_eq!(piece.get(1).unwrap(), AnyValue::Null);
    }

    #[test]
    fn test_semicolon_with_bom() {
        let file = create_temp_csv("\u{feff}A;B\n1;2\n".as_bytes());
        let table = read_csv_table(file.path()).unwrap();

        assert_eq!(table.delimiter, b';');
        assert_eq!(table.headers, vec!["A", "B"]);
        assert!(table.frame.column("A").is_ok());
    }

    #[test]
    fn test_header_below_preamble() {
        let file = create_temp_csv(
            "\u{feff}Outbound export\nprinted 2025-03-10;;\nRelease number;Quantity\n2001;620\n".as_bytes(),
        );
        let table = read_csv_table_skipping(file.path(), 2).unwrap();

        assert_eq!(table.delimiter, b';');
        assert_eq!(table.headers, vec!["Release number", "Quantity"]);
        assert_eq!(table.frame.height(), 1);
    }

    #[test]
    fn test_preamble_longer_than_file() {
        let file = create_temp_csv(b"title\n");
        assert!(matches!(
            read_csv_table_skipping(file.path(), 3),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_utf16_rejected() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'A', 0x00]);
        let result = read_csv_table(file.path());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv(b"");
        assert!(matches!(
            read_csv_table(file.path()),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv_frame(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
