//! Column tables: ordered, equal-length, uniquely named numeric columns.

use std::fmt;

/// Errors raised when a column would break the table invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A column with this name already exists
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Column length differs from the table's row count
    #[error("Column '{name}' has {found} rows, table has {expected}")]
    LengthMismatch {
        /// Offending column
        name: String,
        /// Row count of the table
        expected: usize,
        /// Row count of the column
        found: usize,
    },
}

/// Values of one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Integer values
    Int(Vec<i64>),
    /// Floating point values
    Float(Vec<f64>),
}

impl ColumnData {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-filled column of the same type and length
    pub fn zeros_like(&self) -> Self {
        match self {
            Self::Int(v) => Self::Int(vec![0; v.len()]),
            Self::Float(v) => Self::Float(vec![0.0; v.len()]),
        }
    }

    /// Value at `row` widened to `f64`
    pub fn value(&self, row: usize) -> Option<f64> {
        match self {
            Self::Int(v) => v.get(row).map(|&x| x as f64),
            Self::Float(v) => v.get(row).copied(),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column values
    pub data: ColumnData,
}

impl Column {
    /// Create a column
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Ordered sequence of equal-length, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    columns: Vec<Column>,
}

impl ColumnTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns, checking the invariants
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Result<Self, TableError> {
        let mut table = Self::new();
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    /// Append a column
    pub fn push(&mut self, column: Column) -> Result<(), TableError> {
        if self.contains(&column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if let Some(first) = self.columns.first() {
            let expected = first.data.len();
            if column.data.len() != expected {
                return Err(TableError::LengthMismatch {
                    name: column.name,
                    expected,
                    found: column.data.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of rows shared by every column
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether a column with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Iterate over columns in order
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Consume the table, yielding its columns
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Values of one row, widened to `f64`
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        self.columns.iter().map(|c| c.data.value(row)).collect()
    }
}

impl<'a> IntoIterator for &'a ColumnTable {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl fmt::Display for ColumnTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} columns x {} rows [{}]", self.len(), self.n_rows(), self.names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_checks_invariants() {
        let mut table = ColumnTable::new();
        table.push(Column::new("a", ColumnData::Float(vec![1.0, 2.0]))).unwrap();
        table.push(Column::new("b", ColumnData::Int(vec![3, 4]))).unwrap();

        let dup = table.push(Column::new("a", ColumnData::Int(vec![0, 0])));
        assert_eq!(dup, Err(TableError::DuplicateColumn("a".to_string())));

        let short = table.push(Column::new("c", ColumnData::Int(vec![0])));
        assert!(matches!(short, Err(TableError::LengthMismatch { expected: 2, found: 1, .. })));

        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.row(1), Some(vec![2.0, 4.0]));
        assert_eq!(table.row(2), None);
    }

    #[test]
    fn test_zeros_like_keeps_type() {
        assert_eq!(ColumnData::Int(vec![5, 6]).zeros_like(), ColumnData::Int(vec![0, 0]));
        assert_eq!(ColumnData::Float(vec![5.0]).zeros_like(), ColumnData::Float(vec![0.0]));
    }

    #[test]
    fn test_display() {
        let table = ColumnTable::from_columns([
            Column::new("energy", ColumnData::Float(vec![1.0])),
            Column::new("i0", ColumnData::Float(vec![2.0])),
        ])
        .unwrap();
        assert_eq!(table.to_string(), "2 columns x 1 rows [energy, i0]");
    }
}
