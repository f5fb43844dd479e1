//! Column identity

use indexpilot_common::Keyed;
use std::fmt;

/// A fully qualified column reference. Names are normalized to lowercase at
/// construction, so key comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
}

impl Column {
    pub fn new(schema_name: &str, table_name: &str, column_name: &str) -> Self {
        Column {
            schema_name: schema_name.to_lowercase(),
            table_name: table_name.to_lowercase(),
            column_name: column_name.to_lowercase(),
        }
    }

    /// One column per name, all on the same table.
    pub fn many(schema_name: &str, table_name: &str, column_names: &[&str]) -> Vec<Column> {
        column_names
            .iter()
            .map(|name| Column::new(schema_name, table_name, name))
            .collect()
    }
}

impl Keyed for Column {
    fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.schema_name, self.table_name, self.column_name
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.schema_name, self.table_name, self.column_name
        )
    }
}
