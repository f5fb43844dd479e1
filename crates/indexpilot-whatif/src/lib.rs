//! indexpilot What-If Optimizer - the cost oracle
//!
//! The advisor never estimates cost itself. It asks a database session that
//! supports hypothetical indexes: indexes the planner costs as if they
//! existed, without building anything. This crate defines that capability
//! and two backends: a TiDB session over the MySQL wire protocol, and a
//! deterministic in-process mock for tests.

mod mock;
mod tidb;

pub use mock::MockOptimizer;
pub use tidb::{OptimizerStats, TidbWhatIfOptimizer};

use indexpilot_common::Result;
use indexpilot_workload::{Index, Plan};

/// A database session that can cost queries against indexes that do not
/// physically exist.
///
/// Implementations are exclusive resources: one statement in flight at a
/// time. Between `create_hypo_index(i)` and `drop_hypo_index(i)`, every
/// `explain` sees `i` in the planner's search space; callers must pair the
/// two on every path, including failures.
pub trait WhatIfOptimizer {
    /// Run a DDL or session statement.
    fn execute(&mut self, statement: &str) -> Result<()>;

    /// Register a hypothetical index. Registering an index whose key is
    /// already registered is an error; drop it first.
    fn create_hypo_index(&mut self, index: &Index) -> Result<()>;

    /// Remove a previously registered hypothetical index.
    fn drop_hypo_index(&mut self, index: &Index) -> Result<()>;

    /// Plan the query under the currently registered hypothetical indexes.
    fn explain(&mut self, query: &str) -> Result<Plan>;

    /// Release the underlying connection.
    fn close(&mut self) -> Result<()>;
}
