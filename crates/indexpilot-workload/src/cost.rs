//! Workload-level cost of an index configuration

/// Cost of running the whole workload under one index configuration, as
/// estimated by the what-if optimizer.
///
/// A zero `total_number_of_index_columns` marks an uninitialized cost (no
/// configuration was evaluated yet); it never compares less than anything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexConfCost {
    pub total_workload_query_cost: f64,
    pub total_number_of_index_columns: usize,
}

impl IndexConfCost {
    pub fn new(total_workload_query_cost: f64, total_number_of_index_columns: usize) -> Self {
        IndexConfCost {
            total_workload_query_cost,
            total_number_of_index_columns,
        }
    }

    /// Strict-weak "cheaper than" ordering. Costs within 10 absolute or 1%
    /// relative of each other count as equal, and the tie goes to the
    /// configuration with fewer index columns.
    pub fn less(&self, other: &IndexConfCost) -> bool {
        if self.total_number_of_index_columns == 0 {
            // not initialized
            return false;
        }
        if other.total_number_of_index_columns == 0 {
            // not initialized
            return true;
        }
        let (a, b) = (
            self.total_workload_query_cost,
            other.total_workload_query_cost,
        );
        let diff = (a - b).abs();
        if diff < 10.0 || diff / a.max(b) < 0.01 {
            return self.total_number_of_index_columns < other.total_number_of_index_columns;
        }
        a < b
    }
}
