//! indexpilot Workload - the value types the advisor reasons about
//!
//! A workload is a set of SQL statements with frequencies plus the schemas
//! of the tables they touch. Everything here is an immutable value type
//! identified by its `Keyed::key()` string; construction normalizes names
//! to lowercase.

mod column;
mod cost;
mod index;
mod loader;
mod plan;
mod sql;
mod table;

pub use column::Column;
pub use cost::IndexConfCost;
pub use index::Index;
pub use loader::{create_workload_from_raw_stmts, load_workload_info, parse_create_table};
pub use plan::Plan;
pub use sql::{Sql, SqlType};
pub use table::{SampleRows, TableName, TableSchema, TableStats};

use indexpilot_common::{Error, Result, Set};

/// Everything the advisor knows about one workload: the statements, the
/// schemas of the tables they touch, and the indexable columns the analyzer
/// derived from them.
#[derive(Debug, Clone, Default)]
pub struct WorkloadInfo {
    pub sqls: Set<Sql>,
    pub table_schemas: Set<TableSchema>,
    pub table_stats: Set<TableStats>,
    pub indexable_columns: Set<Column>,
    pub sample_rows: Vec<SampleRows>,
}

impl WorkloadInfo {
    /// Distinct schema names, in first-seen order over the table set.
    pub fn all_schema_names(&self) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for table in self.table_schemas.iter() {
            if !result.contains(&table.schema_name) {
                result.push(table.schema_name.clone());
            }
        }
        result
    }

    /// Schema of the given table, if known.
    pub fn table_schema(&self, schema_name: &str, table_name: &str) -> Option<&TableSchema> {
        self.table_schemas.get(&format!(
            "{}.{}",
            schema_name.to_lowercase(),
            table_name.to_lowercase()
        ))
    }

    /// Every indexable column must reference a known table.
    pub fn validate(&self) -> Result<()> {
        for column in self.indexable_columns.iter() {
            let table_key = format!("{}.{}", column.schema_name, column.table_name);
            if !self.table_schemas.contains_key(&table_key) {
                return Err(Error::TableNotFound(table_key));
            }
        }
        Ok(())
    }
}
