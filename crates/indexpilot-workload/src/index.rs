//! Secondary index model

use crate::Column;
use indexpilot_common::Keyed;

/// A secondary index, physical or hypothetical. Identity is the schema, the
/// table and the ordered column list; the index name is carried for DDL but
/// is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub schema_name: String,
    pub table_name: String,
    pub index_name: String,
    pub columns: Vec<Column>,
}

impl Index {
    pub fn new(
        schema_name: &str,
        table_name: &str,
        index_name: &str,
        column_names: &[&str],
    ) -> Self {
        Index {
            schema_name: schema_name.to_lowercase(),
            table_name: table_name.to_lowercase(),
            index_name: index_name.to_lowercase(),
            columns: Column::many(schema_name, table_name, column_names),
        }
    }

    /// Single-column candidate index named after its column.
    pub fn from_column(column: &Column) -> Self {
        Index {
            schema_name: column.schema_name.clone(),
            table_name: column.table_name.clone(),
            index_name: format!("idx_{}", column.column_name),
            columns: vec![column.clone()],
        }
    }

    /// A copy with `column` appended, renamed to cover the new column list.
    pub fn extended_with(&self, column: &Column) -> Self {
        let mut columns = self.columns.clone();
        columns.push(column.clone());
        let index_name = format!(
            "idx_{}",
            columns
                .iter()
                .map(|c| c.column_name.as_str())
                .collect::<Vec<_>>()
                .join("_")
        );
        Index {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            index_name,
            columns,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column_name.clone()).collect()
    }

    pub fn contains_column(&self, column: &Column) -> bool {
        self.columns
            .iter()
            .any(|c| c.column_name == column.column_name)
    }

    /// `CREATE INDEX` statement for this index.
    pub fn ddl(&self) -> String {
        format!(
            "CREATE INDEX {} ON {}.{} ({})",
            self.index_name,
            self.schema_name,
            self.table_name,
            self.column_names().join(", ")
        )
    }

    /// Whether `other`'s column list is a prefix of this index's, on the
    /// same table. A prefix-containing index subsumes the contained one for
    /// most planner decisions.
    pub fn prefix_contain(&self, other: &Index) -> bool {
        if self.schema_name != other.schema_name
            || self.table_name != other.table_name
            || self.columns.len() < other.columns.len()
        {
            return false;
        }
        other
            .columns
            .iter()
            .zip(&self.columns)
            .all(|(a, b)| a.column_name == b.column_name)
    }
}

impl Keyed for Index {
    fn key(&self) -> String {
        format!(
            "{}.{}({})",
            self.schema_name,
            self.table_name,
            self.column_names().join(",")
        )
    }
}
