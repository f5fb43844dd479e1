//! indexpilot Advisor - cost-guided index selection
//!
//! Given an analyzed workload and a what-if optimizer session, pick up to K
//! secondary indexes that minimize the estimated workload cost. The search
//! is the AutoAdmin scheme: per index width, enumerate small candidate
//! subsets exhaustively, grow greedily, keep the best configuration across
//! widths, and finally drop members whose removal costs nothing.

mod auto_admin;
mod candidate;
mod cost;

pub use auto_admin::select_indexes;
pub use candidate::{extend_candidates, single_column_candidates};
pub use cost::evaluate_index_conf_cost;

use indexpilot_common::{Error, Result, Set};
use indexpilot_whatif::WhatIfOptimizer;
use indexpilot_workload::{Index, IndexConfCost, WorkloadInfo};

/// Tunables of the selection search.
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    /// Upper bound on the number of recommended indexes (K).
    pub max_indexes_to_recommend: usize,
    /// Maximum number of columns per candidate index.
    pub max_columns_per_index: usize,
    /// At or below `naive + K` candidates, subsets are enumerated
    /// exhaustively instead of greedily.
    pub naive_enumeration_threshold: usize,
}

impl Parameter {
    pub fn new(max_indexes_to_recommend: usize) -> Self {
        Parameter {
            max_indexes_to_recommend,
            max_columns_per_index: 3,
            naive_enumeration_threshold: 2,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_indexes_to_recommend == 0 {
            return Err(Error::InvalidParameter(
                "max_indexes_to_recommend must be at least 1".to_string(),
            ));
        }
        if self.max_columns_per_index == 0 {
            return Err(Error::InvalidParameter(
                "max_columns_per_index must be at least 1".to_string(),
            ));
        }
        if self.naive_enumeration_threshold == 0 {
            return Err(Error::InvalidParameter(
                "naive_enumeration_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a selection run. `original_cost` is the workload cost without
/// any hypothetical index, for reporting the improvement.
#[derive(Debug, Clone)]
pub struct AdvisorResult {
    pub recommended_indexes: Set<Index>,
    pub original_cost: IndexConfCost,
    pub optimized_cost: IndexConfCost,
}

impl AdvisorResult {
    /// CREATE INDEX statements for the recommendation, in key order.
    pub fn ddl_statements(&self) -> Vec<String> {
        self.recommended_indexes.iter().map(|i| i.ddl()).collect()
    }
}

/// Validate inputs, run the selection and report costs before and after.
/// The workload must already have its indexable columns populated.
pub fn advise(
    workload: &WorkloadInfo,
    parameter: Parameter,
    optimizer: &mut dyn WhatIfOptimizer,
) -> Result<AdvisorResult> {
    parameter.validate()?;
    workload.validate()?;

    let recommended = select_indexes(workload, parameter, optimizer)?;
    let original_cost = evaluate_index_conf_cost(workload, optimizer, &Set::new())?;
    let optimized_cost = evaluate_index_conf_cost(workload, optimizer, &recommended)?;

    Ok(AdvisorResult {
        recommended_indexes: recommended,
        original_cost,
        optimized_cost,
    })
}
