//! indexpilot - a cost-guided secondary-index advisor for TiDB-compatible
//! databases
//!
//! Given a workload (SQL statements with frequencies) and the schemas of
//! the tables they touch, indexpilot recommends up to K secondary indexes
//! that minimize the estimated workload cost. Cost estimates come from a
//! what-if optimizer: a database session that pretends indexes exist and
//! reports the planner's cost for each query.
//!
//! # Example
//!
//! ```rust
//! use indexpilot::{recommend, Parameter};
//! use indexpilot::analyzer::select_indexable_columns;
//! use indexpilot::whatif::MockOptimizer;
//! use indexpilot::workload::create_workload_from_raw_stmts;
//!
//! let mut workload = create_workload_from_raw_stmts(
//!     "test",
//!     &["create table t (a int, b int, c int)".to_string()],
//!     &["select * from t where a = 1".to_string()],
//! )
//! .unwrap();
//! select_indexable_columns(&mut workload).unwrap();
//!
//! let mut optimizer = MockOptimizer::new(&workload);
//! let result = recommend(workload, Parameter::new(1), &mut optimizer).unwrap();
//! assert_eq!(
//!     result.ddl_statements(),
//!     vec!["CREATE INDEX idx_a ON test.t (a)".to_string()]
//! );
//! ```

pub use indexpilot_advisor as advisor;
pub use indexpilot_analyzer as analyzer;
pub use indexpilot_common as common;
pub use indexpilot_parser as parser;
pub use indexpilot_whatif as whatif;
pub use indexpilot_workload as workload;

pub use indexpilot_advisor::{AdvisorResult, Parameter};
pub use indexpilot_common::{Error, Result};
pub use indexpilot_whatif::WhatIfOptimizer;
pub use indexpilot_workload::WorkloadInfo;

/// Analyze the workload's indexable columns, then recommend up to
/// `parameter.max_indexes_to_recommend` indexes against the given what-if
/// optimizer session.
pub fn recommend(
    mut workload: WorkloadInfo,
    parameter: Parameter,
    optimizer: &mut dyn WhatIfOptimizer,
) -> Result<AdvisorResult> {
    indexpilot_analyzer::select_indexable_columns(&mut workload)?;
    indexpilot_advisor::advise(&workload, parameter, optimizer)
}
