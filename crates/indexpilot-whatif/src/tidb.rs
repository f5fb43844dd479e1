//! TiDB what-if backend
//!
//! TiDB supports hypothetical indexes natively: `CREATE INDEX ... TYPE HYPO`
//! registers an index the planner costs but never materializes, scoped to
//! the session. Plan costs come from `EXPLAIN FORMAT = 'verbose'`, whose
//! root row carries the estimated cost in its third column.

use hashbrown::HashSet;
use indexpilot_common::{Error, Keyed, Result};
use indexpilot_workload::{Index, Plan};
use mysql::prelude::Queryable;
use mysql::{Conn, Opts, Row};
use tracing::debug;

use crate::WhatIfOptimizer;

/// Round-trip counters for one optimizer session.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizerStats {
    pub execute_count: u64,
    pub explain_count: u64,
    pub hypo_index_count: u64,
}

/// What-if optimizer backed by one TiDB session.
pub struct TidbWhatIfOptimizer {
    conn: Conn,
    /// Keys of the hypothetical indexes currently registered. Creating a
    /// key twice without dropping it is an engine invariant violation.
    hypo_indexes: HashSet<String>,
    stats: OptimizerStats,
}

impl TidbWhatIfOptimizer {
    /// Connect with a URL such as `mysql://root@127.0.0.1:4000/test`.
    pub fn connect(dsn: &str) -> Result<Self> {
        let opts =
            Opts::from_url(dsn).map_err(|e| Error::Optimizer(format!("bad DSN {}: {}", dsn, e)))?;
        let conn = Conn::new(opts).map_err(transport)?;
        Ok(TidbWhatIfOptimizer {
            conn,
            hypo_indexes: HashSet::new(),
            stats: OptimizerStats::default(),
        })
    }

    pub fn stats(&self) -> OptimizerStats {
        self.stats
    }
}

fn transport(e: mysql::Error) -> Error {
    Error::Optimizer(e.to_string())
}

impl WhatIfOptimizer for TidbWhatIfOptimizer {
    fn execute(&mut self, statement: &str) -> Result<()> {
        debug!(statement, "execute");
        self.stats.execute_count += 1;
        self.conn.query_drop(statement).map_err(transport)
    }

    fn create_hypo_index(&mut self, index: &Index) -> Result<()> {
        let key = index.key();
        if !self.hypo_indexes.insert(key.clone()) {
            return Err(Error::HypoIndexExists(key));
        }
        let statement = format!(
            "CREATE INDEX {} TYPE HYPO ON {}.{} ({})",
            index.index_name,
            index.schema_name,
            index.table_name,
            index.column_names().join(", ")
        );
        match self.execute(&statement) {
            Ok(()) => {
                self.stats.hypo_index_count += 1;
                Ok(())
            }
            Err(e) => {
                self.hypo_indexes.remove(&key);
                Err(e)
            }
        }
    }

    fn drop_hypo_index(&mut self, index: &Index) -> Result<()> {
        let key = index.key();
        if !self.hypo_indexes.remove(&key) {
            return Err(Error::HypoIndexNotFound(key));
        }
        let statement = format!(
            "DROP INDEX {} ON {}.{}",
            index.index_name, index.schema_name, index.table_name
        );
        self.execute(&statement)
    }

    fn explain(&mut self, query: &str) -> Result<Plan> {
        debug!(statement = query, "explain");
        self.stats.explain_count += 1;
        let rows: Vec<Row> = self
            .conn
            .query(format!("EXPLAIN FORMAT = 'verbose' {}", query))
            .map_err(transport)?;
        let mut plan_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for i in 0..row.len() {
                let cell: String = row
                    .get_opt::<String, usize>(i)
                    .and_then(|value| value.ok())
                    .unwrap_or_default();
                cells.push(cell);
            }
            plan_rows.push(cells);
        }
        if plan_rows.is_empty() {
            return Err(Error::InvalidPlan(format!("empty plan for {}", query)));
        }
        Ok(Plan::new(plan_rows))
    }

    fn close(&mut self) -> Result<()> {
        // the session (and any hypothetical index registered in it) ends
        // when the connection drops
        self.hypo_indexes.clear();
        Ok(())
    }
}
