//! kotor-twoda reads and writes 2DA tables, the spreadsheet-like resources that hold most of
//! KotOR's game rules (`appearance.2da`, `baseitems.2da`, `spells.2da`, ...).
//!
//! A table has a list of column headers and a list of rows. Every row has a label and exactly
//! one cell per column. Cells are plain strings; an empty cell corresponds to `****` in the
//! game's text representation.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kotor_twoda::TwoDA;
//! use std::io::Cursor;
//!
//! let mut table = TwoDA::new(vec!["label", "cost"]);
//! let row = table.add_row(None, vec![("label", "sword"), ("cost", "10")])?;
//! assert_eq!(table.get_cell(row, "cost"), Some("10"));
//!
//! let mut bytes = vec![];
//! table.write_to(&mut bytes)?;
//! assert_eq!(TwoDA::read_from(Cursor::new(bytes))?, table);
//! # Ok(()) }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

mod read;
mod write;

use kotor_support::{DecodeStringError, EncodeStringError, ReadStringError, WriteStringError};
use std::io::{self, Read, Write};

/// Errors that may occur while reading, writing, or editing a 2DA table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file does not start with the `2DA V2.b` signature.
    #[error("not a binary 2DA file (signature {0:?})")]
    InvalidSignature(String),
    /// A column with this header does not exist.
    #[error("column {0:?} does not exist")]
    MissingColumn(String),
    /// A column with this header already exists.
    #[error("column {0:?} already exists")]
    DuplicateColumn(String),
    /// A row index was out of range.
    #[error("row {0} does not exist")]
    RowIndex(usize),
    /// A cell offset pointed outside the cell data.
    #[error("cell offset {0} is out of range")]
    CellOffset(u16),
    /// The cell data does not fit in the 64KiB the format can address.
    #[error("cell data is too large ({0} bytes)")]
    TooLarge(usize),
    /// A string could not be decoded.
    #[error(transparent)]
    DecodeStringError(#[from] DecodeStringError),
    /// A string could not be encoded.
    #[error(transparent)]
    EncodeStringError(#[from] EncodeStringError),
    /// The underlying reader or writer failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl From<ReadStringError> for Error {
    fn from(err: ReadStringError) -> Self {
        match err {
            ReadStringError::DecodeStringError(err) => Error::DecodeStringError(err),
            ReadStringError::IoError(err) => Error::IoError(err),
        }
    }
}

impl From<WriteStringError> for Error {
    fn from(err: WriteStringError) -> Self {
        match err {
            WriteStringError::EncodeStringError(err) => Error::EncodeStringError(err),
            WriteStringError::IoError(err) => Error::IoError(err),
        }
    }
}

/// Result type for 2DA operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single row of a 2DA table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Row {
    label: String,
    cells: Vec<String>,
}

impl Row {
    /// The row label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The cells of this row, in column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// A 2DA table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TwoDA {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl TwoDA {
    /// Create an empty table with the given column headers.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    /// Read a binary 2DA table.
    pub fn read_from(input: impl Read) -> Result<Self> {
        read::read_twoda(input)
    }

    /// Write this table in the binary 2DA layout.
    pub fn write_to(&self, output: impl Write) -> Result<()> {
        write::write_twoda(self, output)
    }

    /// Serialize this table into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// The column headers, in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// The number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Find the position of a column.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over the rows in order.
    pub fn rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Get the label of a row.
    pub fn label(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(Row::label)
    }

    /// Change the label of a row.
    pub fn set_label(&mut self, row: usize, label: impl Into<String>) -> Result<()> {
        let target = self.rows.get_mut(row).ok_or(Error::RowIndex(row))?;
        target.label = label.into();
        Ok(())
    }

    /// Get a cell by row index and column header.
    pub fn get_cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column_index(header)?;
        self.rows.get(row).map(|r| r.cells[column].as_str())
    }

    /// Set a cell by row index and column header.
    pub fn set_cell(&mut self, row: usize, header: &str, value: impl Into<String>) -> Result<()> {
        let column = self
            .column_index(header)
            .ok_or_else(|| Error::MissingColumn(header.to_string()))?;
        let target = self.rows.get_mut(row).ok_or(Error::RowIndex(row))?;
        target.cells[column] = value.into();
        Ok(())
    }

    /// Get all the cells of a column, in row order.
    pub fn get_column(&self, header: &str) -> Option<Vec<&str>> {
        let column = self.column_index(header)?;
        Some(self.rows.iter().map(|r| r.cells[column].as_str()).collect())
    }

    /// Append a row. Columns not named in `cells` are left empty.
    ///
    /// Without a label, the row is labelled with its own index. Returns the new row's index.
    pub fn add_row<K, V>(
        &mut self,
        label: Option<String>,
        cells: impl IntoIterator<Item = (K, V)>,
    ) -> Result<usize>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let index = self.rows.len();
        let mut row = Row {
            label: label.unwrap_or_else(|| index.to_string()),
            cells: vec![String::new(); self.headers.len()],
        };
        for (header, value) in cells {
            let header = header.as_ref();
            let column = self
                .column_index(header)
                .ok_or_else(|| Error::MissingColumn(header.to_string()))?;
            row.cells[column] = value.into();
        }
        self.rows.push(row);
        Ok(index)
    }

    /// Append a copy of an existing row under a new label. Returns the new row's index.
    pub fn copy_row(&mut self, source: usize, label: impl Into<String>) -> Result<usize> {
        let mut row = self.rows.get(source).ok_or(Error::RowIndex(source))?.clone();
        row.label = label.into();
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Remove a row, returning it.
    pub fn remove_row(&mut self, row: usize) -> Result<Row> {
        if row < self.rows.len() {
            Ok(self.rows.remove(row))
        } else {
            Err(Error::RowIndex(row))
        }
    }

    /// Append a column, filling every existing row with `default`.
    pub fn add_column(&mut self, header: impl Into<String>, default: &str) -> Result<()> {
        let header = header.into();
        if self.column_index(&header).is_some() {
            return Err(Error::DuplicateColumn(header));
        }
        self.headers.push(header);
        for row in &mut self.rows {
            row.cells.push(default.to_string());
        }
        Ok(())
    }

    /// Remove a column and its cells.
    pub fn remove_column(&mut self, header: &str) -> Result<()> {
        let column = self
            .column_index(header)
            .ok_or_else(|| Error::MissingColumn(header.to_string()))?;
        self.headers.remove(column);
        for row in &mut self.rows {
            row.cells.remove(column);
        }
        Ok(())
    }

    /// Find the first row with the given label.
    pub fn find_row_by_label(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.label == label)
    }

    /// Find the first row whose cell in `header` equals `value`.
    pub fn find_row_by_cell(&self, header: &str, value: &str) -> Option<usize> {
        let column = self.column_index(header)?;
        self.rows.iter().position(|r| r.cells[column] == value)
    }

    /// The largest cell in a column that parses as an integer.
    ///
    /// Returns `None` if the column does not exist or holds no integers.
    pub fn column_max(&self, header: &str) -> Option<i64> {
        let column = self.column_index(header)?;
        self.rows
            .iter()
            .filter_map(|r| r.cells[column].trim().parse::<i64>().ok())
            .max()
    }

    /// The largest row label that parses as an integer.
    pub fn label_max(&self) -> Option<i64> {
        self.rows
            .iter()
            .filter_map(|r| r.label.trim().parse::<i64>().ok())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TwoDA {
        let mut table = TwoDA::new(vec!["Col1", "Col2", "label"]);
        table
            .add_row(Some("0".into()), vec![("Col1", "a"), ("label", "first")])
            .unwrap();
        table
            .add_row(Some("1".into()), vec![("Col1", " "), ("Col2", "2")])
            .unwrap();
        table
    }

    #[test]
    fn add_row_fills_missing_cells() {
        let table = table();
        assert_eq!(table.get_cell(0, "Col2"), Some(""));
        assert_eq!(table.get_cell(1, "Col2"), Some("2"));
        assert_eq!(table.row(0).map(|r| r.cells().len()), Some(3));
    }

    #[test]
    fn add_row_default_label() {
        let mut table = table();
        let row = table.add_row(None, Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(table.label(row), Some("2"));
    }

    #[test]
    fn add_row_rejects_unknown_columns() {
        let mut table = table();
        assert!(matches!(
            table.add_row(None, vec![("Nope", "x")]),
            Err(Error::MissingColumn(_))
        ));
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn add_column_backfills() {
        let mut table = table();
        table.add_column("Col3", "x").unwrap();
        assert_eq!(table.get_column("Col3"), Some(vec!["x", "x"]));
        assert!(matches!(
            table.add_column("Col3", ""),
            Err(Error::DuplicateColumn(_))
        ));
    }

    #[test]
    fn column_max_skips_non_integers() {
        let table = table();
        assert_eq!(table.column_max("Col2"), Some(2));
        assert_eq!(table.column_max("Col1"), None);
        assert_eq!(table.label_max(), Some(1));
    }

    #[test]
    fn find_rows() {
        let table = table();
        assert_eq!(table.find_row_by_label("1"), Some(1));
        assert_eq!(table.find_row_by_cell("label", "first"), Some(0));
        assert_eq!(table.find_row_by_cell("label", "missing"), None);
    }

    #[test]
    fn copy_row_keeps_cells() {
        let mut table = table();
        let row = table.copy_row(0, "5").unwrap();
        assert_eq!(table.label(row), Some("5"));
        assert_eq!(table.get_cell(row, "label"), Some("first"));
        let removed = table.remove_row(row).unwrap();
        assert_eq!(removed.label(), "5");
        assert_eq!(table.height(), 2);
        assert!(table.remove_row(2).is_err());
    }
}
