//! Input checks run before any file is written or binary invoked.

use crate::error::{L3Error, Result};
use crate::table::Table;

/// Checks user supplied column names against the table.
///
/// The character `:` separates column names from values in readable rules,
/// so it may not appear in a name.
pub fn check_column_names(table: &Table, column_names: &[String]) -> Result<()> {
    if column_names.len() != table.columns().len() {
        return Err(L3Error::Config(format!(
            "The number of column names ({}) and columns in '{}' ({}) are different",
            column_names.len(),
            table.name(),
            table.columns().len()
        )));
    }

    for name in column_names {
        if name.contains(':') {
            return Err(L3Error::Config(format!(
                "The character ':' is not allowed in column names: '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Rejects tables holding numeric cells.
pub fn check_categorical(table: &Table) -> Result<()> {
    for row in table.rows() {
        if let Some(idx) = row.iter().position(|cell| cell.is_numeric()) {
            return Err(L3Error::NonCategorical(table.columns()[idx].clone()));
        }
    }
    Ok(())
}

/// A stem names files in the working directory, so it must be a bare
/// file name.
pub fn check_stem(stem: &str) -> Result<()> {
    if stem.trim().is_empty() {
        return Err(L3Error::Config("Stem cannot be empty".to_string()));
    }
    if stem.contains('/') || stem.contains('\\') || stem == "." || stem == ".." {
        return Err(L3Error::Config(format!(
            "Stem '{}' must not contain path separators",
            stem
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table() -> Table {
        Table::new("t", vec!["a".to_string(), "b".to_string()])
            .with_rows(vec![vec!["x", "y"]])
            .unwrap()
    }

    #[test]
    fn test_column_count_mismatch() {
        let err = check_column_names(&table(), &["a".to_string()]).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_colon_in_column_name() {
        let names = vec!["a".to_string(), "b:c".to_string()];
        assert!(check_column_names(&table(), &names).is_err());
    }

    #[test]
    fn test_valid_column_names() {
        let names = vec!["first".to_string(), "second".to_string()];
        assert!(check_column_names(&table(), &names).is_ok());
    }

    #[test]
    fn test_numeric_cells_rejected() {
        let mut t = Table::new("t", vec!["a".to_string(), "b".to_string()]);
        t.push_row(vec![Cell::from("x"), Cell::from(3.5)]).unwrap();
        match check_categorical(&t) {
            Err(L3Error::NonCategorical(column)) => assert_eq!(column, "b"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_categorical_accepted() {
        assert!(check_categorical(&table()).is_ok());
    }

    #[test]
    fn test_stem_checks() {
        assert!(check_stem("weather").is_ok());
        assert!(check_stem("").is_err());
        assert!(check_stem("../weather").is_err());
    }
}
