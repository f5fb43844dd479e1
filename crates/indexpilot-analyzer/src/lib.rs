//! indexpilot Analyzer - indexable-column selection
//!
//! Walks each workload statement's AST and determines which column
//! references appear in positions a secondary index could accelerate:
//! comparison and range predicates, join keys, GROUP BY, ORDER BY and
//! HAVING. References are resolved against the known table schemas;
//! whatever cannot be resolved unambiguously is dropped silently. Callers
//! that need strict resolution must pre-validate their workload.

mod indexable;
mod scope;
mod tables;

pub use indexable::select_indexable_columns;
pub use tables::collect_table_names;
