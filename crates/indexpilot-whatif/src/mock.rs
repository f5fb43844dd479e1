//! Deterministic in-process what-if backend
//!
//! Lets the whole selection engine run without a server. The cost model is
//! intentionally crude but monotone in the ways the engine relies on: an
//! index helps a query exactly as far as its leading columns appear among
//! the query's indexable columns.

use hashbrown::HashMap;
use indexpilot_common::{Error, Keyed, Result, Set};
use indexpilot_workload::{Column, Index, Plan, WorkloadInfo};
use std::collections::BTreeMap;

use crate::WhatIfOptimizer;

/// Cost of a full table scan in the mock model.
const FULL_SCAN_COST: f64 = 1_000_000.0;
/// Selectivity credited per matched leading index column.
const COLUMN_SELECTIVITY: f64 = 0.1;

/// What-if backend with a synthetic cost model.
///
/// The cost of a query against one table is `1e6 * 0.1^p`, where `p` is the
/// longest leading prefix of any available index (physical or hypothetical)
/// on that table whose columns all appear among the query's indexable
/// columns. A query's cost sums over the tables it references; a query that
/// references no indexable column costs one full scan.
///
/// Snapshot the workload *after* running the analyzer, otherwise every
/// query looks like a full scan.
pub struct MockOptimizer {
    /// query text -> its indexable columns
    query_columns: HashMap<String, Set<Column>>,
    /// table key -> physical indexes
    physical_indexes: HashMap<String, Vec<Index>>,
    /// currently registered hypothetical indexes, by key
    hypo_indexes: BTreeMap<String, Index>,
    executed: Vec<String>,
    explain_count: u64,
    fail_explains: bool,
}

impl MockOptimizer {
    pub fn new(workload: &WorkloadInfo) -> Self {
        let mut query_columns = HashMap::new();
        for sql in workload.sqls.iter() {
            query_columns.insert(sql.text.clone(), sql.indexable_columns.clone());
        }
        let mut physical_indexes: HashMap<String, Vec<Index>> = HashMap::new();
        for table in workload.table_schemas.iter() {
            physical_indexes.insert(table.key(), table.indexes.clone());
        }
        MockOptimizer {
            query_columns,
            physical_indexes,
            hypo_indexes: BTreeMap::new(),
            executed: Vec::new(),
            explain_count: 0,
            fail_explains: false,
        }
    }

    /// Hypothetical indexes currently registered; zero once an evaluation
    /// cleaned up after itself.
    pub fn active_hypo_count(&self) -> usize {
        self.hypo_indexes.len()
    }

    pub fn explain_count(&self) -> u64 {
        self.explain_count
    }

    /// Statements passed to `execute`, in order.
    pub fn executed_statements(&self) -> &[String] {
        &self.executed
    }

    /// Make every subsequent `explain` fail, to exercise error paths.
    pub fn fail_explains(&mut self, fail: bool) {
        self.fail_explains = fail;
    }

    fn table_cost(&self, table_key: &str, columns: &[&Column]) -> f64 {
        let mut best = FULL_SCAN_COST;
        let physical = self.physical_indexes.get(table_key);
        let available = physical
            .into_iter()
            .flatten()
            .chain(self.hypo_indexes.values().filter(|i| {
                format!("{}.{}", i.schema_name, i.table_name) == table_key
            }));
        for index in available {
            let mut matched = 0;
            for column in &index.columns {
                if columns.iter().any(|c| c.column_name == column.column_name) {
                    matched += 1;
                } else {
                    break;
                }
            }
            let cost = FULL_SCAN_COST * COLUMN_SELECTIVITY.powi(matched);
            if cost < best {
                best = cost;
            }
        }
        best
    }
}

impl WhatIfOptimizer for MockOptimizer {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.executed.push(statement.to_string());
        Ok(())
    }

    fn create_hypo_index(&mut self, index: &Index) -> Result<()> {
        let key = index.key();
        if self.hypo_indexes.contains_key(&key) {
            return Err(Error::HypoIndexExists(key));
        }
        self.hypo_indexes.insert(key, index.clone());
        Ok(())
    }

    fn drop_hypo_index(&mut self, index: &Index) -> Result<()> {
        let key = index.key();
        if self.hypo_indexes.remove(&key).is_none() {
            return Err(Error::HypoIndexNotFound(key));
        }
        Ok(())
    }

    fn explain(&mut self, query: &str) -> Result<Plan> {
        self.explain_count += 1;
        if self.fail_explains {
            return Err(Error::Optimizer("mock explain failure".to_string()));
        }

        let columns = self.query_columns.get(query).cloned().unwrap_or_default();
        let mut per_table: BTreeMap<String, Vec<&Column>> = BTreeMap::new();
        for column in columns.iter() {
            per_table
                .entry(format!("{}.{}", column.schema_name, column.table_name))
                .or_default()
                .push(column);
        }

        let mut total = 0.0;
        if per_table.is_empty() {
            total = FULL_SCAN_COST;
        }
        for (table_key, columns) in &per_table {
            total += self.table_cost(table_key, columns);
        }

        Ok(Plan::new(vec![vec![
            "MockReader_1".to_string(),
            "10000.00".to_string(),
            format!("{:.2}", total),
            "root".to_string(),
            String::new(),
            "synthetic cost model".to_string(),
        ]]))
    }

    fn close(&mut self) -> Result<()> {
        self.hypo_indexes.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexpilot_workload::{Sql, TableSchema};

    fn workload_with_one_query() -> WorkloadInfo {
        let mut workload = WorkloadInfo::default();
        workload.table_schemas.insert(TableSchema::new(
            "test",
            "t",
            Column::many("test", "t", &["a", "b"]),
            vec![],
            "create table t (a int, b int)",
        ));
        let mut sql = Sql::new("test", "select * from t where a = 1");
        sql.indexable_columns.insert(Column::new("test", "t", "a"));
        workload.sqls.insert(sql);
        workload
    }

    #[test]
    fn test_hypo_index_lowers_cost_and_drop_restores_it() {
        let workload = workload_with_one_query();
        let mut optimizer = MockOptimizer::new(&workload);
        let query = "select * from t where a = 1";

        let before = optimizer.explain(query).unwrap().plan_cost().unwrap();
        let index = Index::new("test", "t", "idx_a", &["a"]);
        optimizer.create_hypo_index(&index).unwrap();
        let with_index = optimizer.explain(query).unwrap().plan_cost().unwrap();
        optimizer.drop_hypo_index(&index).unwrap();
        let after = optimizer.explain(query).unwrap().plan_cost().unwrap();

        assert!(with_index < before);
        assert_eq!(before, after);
    }

    #[test]
    fn test_duplicate_create_is_an_error() {
        let workload = workload_with_one_query();
        let mut optimizer = MockOptimizer::new(&workload);
        let index = Index::new("test", "t", "idx_a", &["a"]);
        optimizer.create_hypo_index(&index).unwrap();
        assert!(matches!(
            optimizer.create_hypo_index(&index),
            Err(Error::HypoIndexExists(_))
        ));
        optimizer.drop_hypo_index(&index).unwrap();
        assert!(matches!(
            optimizer.drop_hypo_index(&index),
            Err(Error::HypoIndexNotFound(_))
        ));
    }

    #[test]
    fn test_longer_matched_prefix_is_cheaper() {
        let mut workload = workload_with_one_query();
        let mut sql = Sql::new("test", "select * from t where a = 1 and b = 2");
        sql.indexable_columns.insert(Column::new("test", "t", "a"));
        sql.indexable_columns.insert(Column::new("test", "t", "b"));
        workload.sqls.insert(sql);
        let mut optimizer = MockOptimizer::new(&workload);
        let query = "select * from t where a = 1 and b = 2";

        optimizer
            .create_hypo_index(&Index::new("test", "t", "idx_a", &["a"]))
            .unwrap();
        let single = optimizer.explain(query).unwrap().plan_cost().unwrap();
        optimizer
            .create_hypo_index(&Index::new("test", "t", "idx_ab", &["a", "b"]))
            .unwrap();
        let double = optimizer.explain(query).unwrap().plan_cost().unwrap();
        assert!(double < single);
    }
}
