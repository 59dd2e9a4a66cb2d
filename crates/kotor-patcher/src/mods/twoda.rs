//! Patching of 2DA tables.

use super::PatchTarget;
use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenId};
use kotor_twoda::TwoDA;
use std::fmt;
use std::str::FromStr;

/// Where the text written into a cell (or stored into memory) comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValue {
    /// Literal text.
    Constant(String),
    /// The text stored in a `2DAMEMORY` token.
    Memory2DA(TokenId),
    /// The talk table index stored in a `StrRef` token.
    MemoryStr(TokenId),
    /// One more than the largest integer in a column, or in the row labels when no column is
    /// given.
    High(Option<String>),
    /// The index of the row being patched.
    RowIndex,
    /// The label of the row being patched.
    RowLabel,
    /// A cell of the row being patched.
    RowCell(String),
}

impl RowValue {
    /// Resolve the value against the current state of `twoda`.
    ///
    /// `row` is the row being patched; the row-relative values fail without one.
    pub fn resolve(
        &self,
        twoda: &TwoDA,
        memory: &PatcherMemory,
        row: Option<usize>,
    ) -> Result<String> {
        match self {
            RowValue::Constant(value) => Ok(value.clone()),
            RowValue::Memory2DA(token) => memory.get_2da(*token).map(str::to_string),
            RowValue::MemoryStr(token) => memory.get_str(*token).map(|n| n.to_string()),
            RowValue::High(None) => {
                Ok(one_more(twoda.label_max(), 0, "the row labels")?.to_string())
            }
            RowValue::High(Some(column)) => {
                if twoda.column_index(column).is_none() {
                    return Err(PatchError::MissingColumn(column.clone()));
                }
                Ok(one_more(twoda.column_max(column), 0, column)?.to_string())
            }
            RowValue::RowIndex => row
                .map(|row| row.to_string())
                .ok_or(PatchError::MissingRowContext),
            RowValue::RowLabel => {
                let row = row.ok_or(PatchError::MissingRowContext)?;
                twoda
                    .label(row)
                    .map(str::to_string)
                    .ok_or(PatchError::IndexOutOfRange(row))
            }
            RowValue::RowCell(column) => {
                let row = row.ok_or(PatchError::MissingRowContext)?;
                if twoda.column_index(column).is_none() {
                    return Err(PatchError::MissingColumn(column.clone()));
                }
                twoda
                    .get_cell(row, column)
                    .map(str::to_string)
                    .ok_or(PatchError::IndexOutOfRange(row))
            }
        }
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        RowValue::Constant(value.to_string())
    }
}

impl From<String> for RowValue {
    fn from(value: String) -> Self {
        RowValue::Constant(value)
    }
}

/// How a [`Target`] finds its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    /// By position.
    RowIndex,
    /// By row label.
    RowLabel,
    /// By the value of the `label` column.
    LabelColumn,
}

/// The address of an existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// How to search.
    pub kind: TargetType,
    /// What to search for.
    pub value: RowValue,
}

impl Target {
    /// Create a target.
    pub fn new(kind: TargetType, value: impl Into<RowValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Find the row this target addresses.
    pub fn resolve(&self, twoda: &TwoDA, memory: &PatcherMemory) -> Result<usize> {
        let value = self.value.resolve(twoda, memory, None)?;
        let found = match self.kind {
            TargetType::RowIndex => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&index| index < twoda.height()),
            TargetType::RowLabel => twoda.find_row_by_label(&value),
            TargetType::LabelColumn => twoda.find_row_by_cell("label", &value),
        };
        found.ok_or_else(|| PatchError::RowNotFound(self.describe(&value)))
    }

    fn describe(&self, value: &str) -> String {
        match self.kind {
            TargetType::RowIndex => format!("row index {}", value),
            TargetType::RowLabel => format!("row label {:?}", value),
            TargetType::LabelColumn => format!("label column value {:?}", value),
        }
    }
}

fn write_cells(
    twoda: &mut TwoDA,
    row: usize,
    cells: &[(String, RowValue)],
    memory: &PatcherMemory,
) -> Result<()> {
    let values = cells
        .iter()
        .map(|(column, value)| {
            if twoda.column_index(column).is_none() {
                return Err(PatchError::MissingColumn(column.clone()));
            }
            Ok((column, value.resolve(twoda, memory, Some(row))?))
        })
        .collect::<Result<Vec<_>>>()?;
    for (column, value) in values {
        twoda.set_cell(row, column, value)?;
    }
    Ok(())
}

fn store_values(
    twoda: &TwoDA,
    row: usize,
    store_2da: &[(TokenId, RowValue)],
    memory: &mut PatcherMemory,
) -> Result<()> {
    let values = store_2da
        .iter()
        .map(|(token, value)| Ok((*token, value.resolve(twoda, memory, Some(row))?)))
        .collect::<Result<Vec<_>>>()?;
    for (token, value) in values {
        memory.set_2da(token, value);
    }
    Ok(())
}

/// One more than `max`, or `default` when there is no maximum.
fn one_more(max: Option<i64>, default: i64, source: &str) -> Result<i64> {
    match max {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| PatchError::NoHigherValue(source.to_string())),
        None => Ok(default),
    }
}

fn next_label(twoda: &TwoDA) -> Result<String> {
    Ok(one_more(twoda.label_max(), twoda.height() as i64, "the row labels")?.to_string())
}

/// Fill in a freshly appended row. On failure the row is removed again.
fn fill_new_row(
    twoda: &mut TwoDA,
    row: usize,
    cells: &[(String, RowValue)],
    store_2da: &[(TokenId, RowValue)],
    memory: &mut PatcherMemory,
) -> Result<()> {
    let filled = write_cells(twoda, row, cells, memory)
        .and_then(|()| store_values(twoda, row, store_2da, memory));
    if filled.is_err() {
        twoda.remove_row(row)?;
    }
    filled
}

/// Look for an existing row that already holds the value the instruction would write into
/// `exclusive_column`.
fn find_exclusive(
    twoda: &TwoDA,
    exclusive_column: Option<&str>,
    cells: &[(String, RowValue)],
    memory: &PatcherMemory,
) -> Result<Option<usize>> {
    let column = match exclusive_column {
        Some(column) if !column.is_empty() => column,
        _ => return Ok(None),
    };
    if twoda.column_index(column).is_none() {
        return Err(PatchError::MissingColumn(column.to_string()));
    }
    match cells.iter().find(|(header, _)| header == column) {
        Some((_, value)) => {
            let value = value.resolve(twoda, memory, None)?;
            Ok(twoda.find_row_by_cell(column, &value))
        }
        None => Ok(None),
    }
}

/// Change cells of an existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    /// Name of the instruction, for logging.
    pub identifier: String,
    /// The row to change.
    pub target: Target,
    /// New cell values, by column header.
    pub cells: Vec<(String, RowValue)>,
    /// Values to store into memory after the change.
    pub store_2da: Vec<(TokenId, RowValue)>,
}

impl ChangeRow {
    /// Create an instruction that changes the row at `target`.
    pub fn new(identifier: impl Into<String>, target: Target) -> Self {
        Self {
            identifier: identifier.into(),
            target,
            cells: vec![],
            store_2da: vec![],
        }
    }

    /// Set a cell.
    pub fn cell(mut self, column: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// Store a value into a `2DAMEMORY` token.
    pub fn store(mut self, token: TokenId, value: RowValue) -> Self {
        self.store_2da.push((token, value));
        self
    }

    fn apply(&self, twoda: &mut TwoDA, memory: &mut PatcherMemory) -> Result<()> {
        let row = self.target.resolve(twoda, memory)?;
        write_cells(twoda, row, &self.cells, memory)?;
        store_values(twoda, row, &self.store_2da, memory)
    }
}

/// Append a row, or edit the row that already holds the exclusive column's value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddRow {
    /// Name of the instruction, for logging.
    pub identifier: String,
    /// Column whose value must be unique.
    pub exclusive_column: Option<String>,
    /// Label of the new row. Defaults to one more than the largest numeric label.
    pub row_label: Option<String>,
    /// Cell values, by column header.
    pub cells: Vec<(String, RowValue)>,
    /// Values to store into memory after the row is written.
    pub store_2da: Vec<(TokenId, RowValue)>,
}

impl AddRow {
    /// Create an instruction that appends a row.
    pub fn new(
        identifier: impl Into<String>,
        exclusive_column: Option<&str>,
        row_label: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            exclusive_column: exclusive_column.map(str::to_string),
            row_label: row_label.map(str::to_string),
            ..Self::default()
        }
    }

    /// Set a cell.
    pub fn cell(mut self, column: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// Store a value into a `2DAMEMORY` token.
    pub fn store(mut self, token: TokenId, value: RowValue) -> Self {
        self.store_2da.push((token, value));
        self
    }

    fn apply(
        &self,
        twoda: &mut TwoDA,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let existing = find_exclusive(
            twoda,
            self.exclusive_column.as_deref(),
            &self.cells,
            memory,
        )?;
        let row = match existing {
            Some(row) => {
                logger.add_verbose(format!(
                    "{}: editing existing row {} instead of adding a new one",
                    self.identifier, row
                ));
                row
            }
            None => {
                let label = match &self.row_label {
                    Some(label) => label.clone(),
                    None => next_label(twoda)?,
                };
                let row = twoda.add_row(Some(label), Vec::<(&str, &str)>::new())?;
                return fill_new_row(twoda, row, &self.cells, &self.store_2da, memory);
            }
        };
        write_cells(twoda, row, &self.cells, memory)?;
        store_values(twoda, row, &self.store_2da, memory)
    }
}

/// Duplicate a row, with some cells overridden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRow {
    /// Name of the instruction, for logging.
    pub identifier: String,
    /// The row to copy.
    pub target: Target,
    /// Column whose value must be unique.
    pub exclusive_column: Option<String>,
    /// Label of the new row. Defaults to one more than the largest numeric label.
    pub row_label: Option<String>,
    /// Cell overrides, by column header.
    pub cells: Vec<(String, RowValue)>,
    /// Values to store into memory after the row is written.
    pub store_2da: Vec<(TokenId, RowValue)>,
}

impl CopyRow {
    /// Create an instruction that copies the row at `target`.
    pub fn new(
        identifier: impl Into<String>,
        target: Target,
        exclusive_column: Option<&str>,
        row_label: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            target,
            exclusive_column: exclusive_column.map(str::to_string),
            row_label: row_label.map(str::to_string),
            cells: vec![],
            store_2da: vec![],
        }
    }

    /// Override a cell.
    pub fn cell(mut self, column: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// Store a value into a `2DAMEMORY` token.
    pub fn store(mut self, token: TokenId, value: RowValue) -> Self {
        self.store_2da.push((token, value));
        self
    }

    fn apply(
        &self,
        twoda: &mut TwoDA,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let source = self.target.resolve(twoda, memory)?;
        let existing = find_exclusive(
            twoda,
            self.exclusive_column.as_deref(),
            &self.cells,
            memory,
        )?;
        let row = match existing {
            Some(row) => {
                logger.add_verbose(format!(
                    "{}: overwriting existing row {} instead of copying row {}",
                    self.identifier, row, source
                ));
                row
            }
            None => {
                let label = match &self.row_label {
                    Some(label) => label.clone(),
                    None => next_label(twoda)?,
                };
                let row = twoda.copy_row(source, label)?;
                return fill_new_row(twoda, row, &self.cells, &self.store_2da, memory);
            }
        };
        write_cells(twoda, row, &self.cells, memory)?;
        if let Some(label) = &self.row_label {
            twoda.set_label(row, label.as_str())?;
        }
        store_values(twoda, row, &self.store_2da, memory)
    }
}

/// A row addressed by an [`AddColumn`] store directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnStore {
    /// `I<index>`: the new column's cell at a row index.
    RowIndex(usize),
    /// `L<label>`: the new column's cell at a row label.
    RowLabel(String),
}

/// Error returned when a column store directive is not `I<index>` or `L<label>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid column store directive {0:?}, expected I<index> or L<label>")]
pub struct ParseColumnStoreError(String);

impl FromStr for ColumnStore {
    type Err = ParseColumnStoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let error = || ParseColumnStoreError(s.to_string());
        let mut chars = s.chars();
        match chars.next() {
            Some('I') | Some('i') => chars
                .as_str()
                .parse()
                .map(ColumnStore::RowIndex)
                .map_err(|_| error()),
            Some('L') | Some('l') if !chars.as_str().is_empty() => {
                Ok(ColumnStore::RowLabel(chars.as_str().to_string()))
            }
            _ => Err(error()),
        }
    }
}

impl fmt::Display for ColumnStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnStore::RowIndex(index) => write!(f, "I{}", index),
            ColumnStore::RowLabel(label) => write!(f, "L{}", label),
        }
    }
}

/// Add a column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddColumn {
    /// Name of the instruction, for logging.
    pub identifier: String,
    /// Header of the new column.
    pub header: String,
    /// Value for rows that are not set explicitly.
    pub default: String,
    /// Values for rows addressed by index.
    pub index_insert: Vec<(usize, RowValue)>,
    /// Values for rows addressed by label.
    pub label_insert: Vec<(String, RowValue)>,
    /// Cells of the new column to store into memory.
    pub store_2da: Vec<(TokenId, ColumnStore)>,
}

impl AddColumn {
    /// Create an instruction that adds the column `header`.
    pub fn new(
        identifier: impl Into<String>,
        header: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            header: header.into(),
            default: default.into(),
            ..Self::default()
        }
    }

    /// Set the cell of the row at `index`.
    pub fn index(mut self, index: usize, value: impl Into<RowValue>) -> Self {
        self.index_insert.push((index, value.into()));
        self
    }

    /// Set the cell of the row labelled `label`.
    pub fn label(mut self, label: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.label_insert.push((label.into(), value.into()));
        self
    }

    /// Store a cell of the new column into a `2DAMEMORY` token.
    pub fn store(mut self, token: TokenId, location: ColumnStore) -> Self {
        self.store_2da.push((token, location));
        self
    }

    fn apply(&self, twoda: &mut TwoDA, memory: &mut PatcherMemory) -> Result<()> {
        twoda.add_column(self.header.as_str(), &self.default)?;

        for (row, value) in &self.index_insert {
            if *row >= twoda.height() {
                return Err(PatchError::IndexOutOfRange(*row));
            }
            let value = value.resolve(twoda, memory, Some(*row))?;
            twoda.set_cell(*row, &self.header, value)?;
        }
        for (label, value) in &self.label_insert {
            let row = twoda
                .find_row_by_label(label)
                .ok_or_else(|| PatchError::RowNotFound(format!("row label {:?}", label)))?;
            let value = value.resolve(twoda, memory, Some(row))?;
            twoda.set_cell(row, &self.header, value)?;
        }

        for (token, location) in &self.store_2da {
            let row = match location {
                ColumnStore::RowIndex(index) => Some(*index),
                ColumnStore::RowLabel(label) => twoda.find_row_by_label(label),
            };
            let value = row
                .and_then(|row| twoda.get_cell(row, &self.header))
                .ok_or_else(|| PatchError::RowNotFound(location.to_string()))?;
            memory.set_2da(*token, value);
        }
        Ok(())
    }
}

/// A 2DA patch instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modify2DA {
    /// Change an existing row.
    ChangeRow(ChangeRow),
    /// Append a row.
    AddRow(AddRow),
    /// Duplicate a row.
    CopyRow(CopyRow),
    /// Add a column.
    AddColumn(AddColumn),
}

impl Modify2DA {
    /// Name of the instruction, for logging.
    pub fn identifier(&self) -> &str {
        match self {
            Modify2DA::ChangeRow(m) => &m.identifier,
            Modify2DA::AddRow(m) => &m.identifier,
            Modify2DA::CopyRow(m) => &m.identifier,
            Modify2DA::AddColumn(m) => &m.identifier,
        }
    }

    /// Apply the instruction.
    pub fn apply(
        &self,
        twoda: &mut TwoDA,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        match self {
            Modify2DA::ChangeRow(m) => m.apply(twoda, memory),
            Modify2DA::AddRow(m) => m.apply(twoda, memory, logger),
            Modify2DA::CopyRow(m) => m.apply(twoda, memory, logger),
            Modify2DA::AddColumn(m) => m.apply(twoda, memory),
        }
    }
}

impl From<ChangeRow> for Modify2DA {
    fn from(m: ChangeRow) -> Self {
        Modify2DA::ChangeRow(m)
    }
}

impl From<AddRow> for Modify2DA {
    fn from(m: AddRow) -> Self {
        Modify2DA::AddRow(m)
    }
}

impl From<CopyRow> for Modify2DA {
    fn from(m: CopyRow) -> Self {
        Modify2DA::CopyRow(m)
    }
}

impl From<AddColumn> for Modify2DA {
    fn from(m: AddColumn) -> Self {
        Modify2DA::AddColumn(m)
    }
}

/// The instructions for one 2DA resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifications2DA {
    /// Where the resource is read from and written to.
    pub target: PatchTarget,
    /// Instructions, applied in order.
    pub modifiers: Vec<Modify2DA>,
}

impl Modifications2DA {
    /// Create an empty set of instructions for a resource.
    pub fn new(target: PatchTarget) -> Self {
        Self {
            target,
            modifiers: vec![],
        }
    }

    /// Add an instruction.
    pub fn push(&mut self, modifier: impl Into<Modify2DA>) {
        self.modifiers.push(modifier.into());
    }

    /// Apply every instruction to the table.
    ///
    /// An instruction that fails is logged as an error and skipped.
    pub fn apply(&self, twoda: &mut TwoDA, memory: &mut PatcherMemory, logger: &mut PatchLogger) {
        for modifier in &self.modifiers {
            log::trace!("{}: applying {}", self.target.saveas, modifier.identifier());
            if let Err(err) = modifier.apply(twoda, memory, logger) {
                logger.add_error(format!(
                    "{}: {} failed: {}",
                    self.target.saveas,
                    modifier.identifier(),
                    err
                ));
            }
        }
    }
}
