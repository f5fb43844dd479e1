//! Candidate index generation

use indexpilot_common::Set;
use indexpilot_workload::{Column, Index, WorkloadInfo};

/// Single-column seed candidates: one index per indexable column, minus
/// those whose column list is already a prefix of a physical index on the
/// same table.
pub fn single_column_candidates(workload: &WorkloadInfo) -> Set<Index> {
    let mut candidates = Set::new();
    for column in workload.indexable_columns.iter() {
        let index = Index::from_column(column);
        if !covered_by_existing(workload, &index) {
            candidates.insert(index);
        }
    }
    candidates
}

/// Width m+1 extensions of a selected width-m configuration: for each
/// selected index, append a column of the same table that some statement
/// uses together with every column the index already has. Extensions that a
/// physical index already covers are discarded.
pub fn extend_candidates(workload: &WorkloadInfo, selected: &Set<Index>) -> Set<Index> {
    let mut extensions = Set::new();
    for index in selected.iter() {
        for column in workload.indexable_columns.iter() {
            if column.schema_name != index.schema_name || column.table_name != index.table_name {
                continue;
            }
            if index.contains_column(column) {
                continue;
            }
            if !appears_with(workload, index, column) {
                continue;
            }
            let extended = index.extended_with(column);
            if !covered_by_existing(workload, &extended) {
                extensions.insert(extended);
            }
        }
    }
    extensions
}

/// Whether some statement references `column` together with every column of
/// `index`.
fn appears_with(workload: &WorkloadInfo, index: &Index, column: &Column) -> bool {
    workload.sqls.iter().any(|sql| {
        sql.indexable_columns.contains(column)
            && index
                .columns
                .iter()
                .all(|c| sql.indexable_columns.contains(c))
    })
}

/// Whether a physical index on the candidate's table already has the
/// candidate's columns as a prefix.
fn covered_by_existing(workload: &WorkloadInfo, candidate: &Index) -> bool {
    workload
        .table_schema(&candidate.schema_name, &candidate.table_name)
        .map(|table| {
            table
                .indexes
                .iter()
                .any(|existing| existing.prefix_contain(candidate))
        })
        .unwrap_or(false)
}
