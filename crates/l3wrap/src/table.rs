//! Categorical tables and the delimited text format read by the L3 binaries.
//!
//! The binaries expect one comma-separated row per line with no header. A
//! table's name doubles as the training stem, so it names every artifact the
//! training run produces.

use crate::error::{L3Error, Result};
use crate::validation::check_column_names;
use std::fmt;
use std::path::Path;

pub const DELIMITER: char = ',';

/// A single table cell. Only `Text` cells can be handed to the binaries.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Number(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(name: S, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, which must have one cell per column.
    pub fn push_row<C: Into<Cell>>(&mut self, row: Vec<C>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(L3Error::Config(format!(
                "Row has {} values but table '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row.into_iter().map(Into::into).collect());
        Ok(())
    }

    pub fn with_rows<C: Into<Cell>>(mut self, rows: Vec<Vec<C>>) -> Result<Self> {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a copy of the table under a different name.
    pub fn renamed<S: Into<String>>(&self, name: S) -> Self {
        Self {
            name: name.into(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }

    /// Replaces the column names, keeping the rows.
    pub fn with_column_names(mut self, names: Vec<String>) -> Result<Self> {
        check_column_names(&self, &names)?;
        self.columns = names;
        Ok(self)
    }

    /// Loads a comma-separated file whose first line holds the column names.
    /// Every value is read as categorical text.
    pub fn from_csv_file<P: AsRef<Path>, S: Into<String>>(path: P, name: S) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => L3Error::FileNotFound(path.to_path_buf()),
            _ => L3Error::Io(e),
        })?;
        Self::from_csv_str(&content, name)
    }

    /// Quoted fields are unquoted; surrounding whitespace is trimmed and
    /// blank lines are skipped.
    pub fn from_csv_str<S: Into<String>>(content: &str, name: S) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(L3Error::Config("Input has no header line".to_string()));
        }

        let mut table = Table::new(name, columns);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().collect::<Vec<_>>())?;
        }
        Ok(table)
    }

    /// Resolves the positions of `selection` in this table, in the order
    /// given. `None` selects every column in table order.
    pub fn column_indices(&self, selection: Option<&[String]>) -> Result<Vec<usize>> {
        match selection {
            None => Ok((0..self.columns.len()).collect()),
            Some([]) => Err(L3Error::Config("Column selection is empty".to_string())),
            Some(names) => names
                .iter()
                .map(|name| {
                    self.columns
                        .iter()
                        .position(|c| c == name)
                        .ok_or_else(|| {
                            L3Error::Config(format!(
                                "Column '{}' is not present in table '{}'",
                                name, self.name
                            ))
                        })
                })
                .collect(),
        }
    }

    /// Renders the rows, restricted to `selection`, as headerless
    /// comma-separated text.
    pub fn to_delimited(&self, selection: Option<&[String]>) -> Result<String> {
        let indices = self.column_indices(selection)?;
        let mut out = String::new();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let mut fields = Vec::with_capacity(indices.len());
            for &idx in &indices {
                let value = row[idx].to_string();
                if value.contains(DELIMITER) || value.contains('\n') || value.contains('\r') {
                    return Err(L3Error::Config(format!(
                        "Value {:?} in row {} column '{}' contains a delimiter or line break",
                        value, row_idx, self.columns[idx]
                    )));
                }
                fields.push(value);
            }
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        Ok(out)
    }

    /// Writes the delimited rendering to `path`. Nothing is written if any
    /// value cannot be serialized.
    pub fn write_delimited<P: AsRef<Path>>(&self, path: P, selection: Option<&[String]>) -> Result<()> {
        let content = self.to_delimited(selection)?;
        log::debug!(
            "Writing {} rows of '{}' to {}",
            self.rows.len(),
            self.name,
            path.as_ref().display()
        );
        std::fs::write(path, content)?;
        Ok(())
    }
}
