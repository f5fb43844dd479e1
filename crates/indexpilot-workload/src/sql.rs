//! Workload statement model

use crate::{Column, Plan};
use indexpilot_common::{Keyed, Set};

/// Statement class, derived from the first keyword of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Select,
    Insert,
    Update,
    Others,
}

/// One statement of the workload with its observed frequency. The statement
/// text is the identity: two occurrences of the same text are one workload
/// entry.
#[derive(Debug, Clone)]
pub struct Sql {
    /// Optional caller-assigned label (e.g. the query file stem).
    pub alias: String,
    /// Default schema for unqualified table names in `text`.
    pub schema_name: String,
    pub text: String,
    pub frequency: u64,
    /// Columns of this statement that an index could serve; populated by the
    /// analyzer.
    pub indexable_columns: Set<Column>,
    /// Plans observed for this statement. A statement may plan differently
    /// under different index configurations.
    pub plans: Vec<Plan>,
}

impl Sql {
    pub fn new(schema_name: &str, text: &str) -> Self {
        Sql {
            alias: String::new(),
            schema_name: schema_name.to_lowercase(),
            text: text.to_string(),
            frequency: 1,
            indexable_columns: Set::new(),
            plans: Vec::new(),
        }
    }

    pub fn sql_type(&self) -> SqlType {
        let text = self.text.trim_start();
        let Some(prefix) = text.get(..6) else {
            return SqlType::Others;
        };
        if prefix.eq_ignore_ascii_case("select") {
            SqlType::Select
        } else if prefix.eq_ignore_ascii_case("insert") {
            SqlType::Insert
        } else if prefix.eq_ignore_ascii_case("update") {
            SqlType::Update
        } else {
            SqlType::Others
        }
    }
}

impl Keyed for Sql {
    fn key(&self) -> String {
        self.text.clone()
    }
}
