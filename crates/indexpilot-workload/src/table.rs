//! Table-level workload metadata

use crate::{Column, Index};
use indexpilot_common::Keyed;
use std::fmt;
use std::path::PathBuf;

/// Schema of one table in the workload, as parsed from its CREATE TABLE
/// statement. `indexes` holds the physical indexes (primary key, unique
/// constraints, secondary keys) that candidate generation prunes against.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub schema_name: String,
    pub table_name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub create_stmt_text: String,
}

impl TableSchema {
    pub fn new(
        schema_name: &str,
        table_name: &str,
        columns: Vec<Column>,
        indexes: Vec<Index>,
        create_stmt_text: &str,
    ) -> Self {
        TableSchema {
            schema_name: schema_name.to_lowercase(),
            table_name: table_name.to_lowercase(),
            columns,
            indexes,
            create_stmt_text: create_stmt_text.to_string(),
        }
    }

    /// Look up a column of this table by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.column_name.eq_ignore_ascii_case(name))
    }
}

impl Keyed for TableSchema {
    fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

/// A bare table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub schema_name: String,
    pub table_name: String,
}

impl TableName {
    pub fn new(schema_name: &str, table_name: &str) -> Self {
        TableName {
            schema_name: schema_name.to_lowercase(),
            table_name: table_name.to_lowercase(),
        }
    }
}

impl Keyed for TableName {
    fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema_name, self.table_name)
    }
}

/// Pointer to an exported statistics file for one table.
#[derive(Debug, Clone)]
pub struct TableStats {
    pub schema_name: String,
    pub table_name: String,
    pub stats_file_path: PathBuf,
}

impl TableStats {
    pub fn new(schema_name: &str, table_name: &str, stats_file_path: PathBuf) -> Self {
        TableStats {
            schema_name: schema_name.to_lowercase(),
            table_name: table_name.to_lowercase(),
            stats_file_path,
        }
    }
}

impl Keyed for TableStats {
    fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

/// Sampled rows of one table, for backends that can load data samples.
#[derive(Debug, Clone)]
pub struct SampleRows {
    pub table_name: String,
}
