//! Workload cost evaluation

use indexpilot_common::{Error, Keyed, Result, Set};
use indexpilot_whatif::WhatIfOptimizer;
use indexpilot_workload::{Index, IndexConfCost, SqlType, WorkloadInfo};
use tracing::warn;

/// Cost the workload as if every index in `conf` existed.
///
/// Each SELECT contributes its plan cost times `max(1, frequency)`; other
/// statement types are not explained. The hypothetical indexes registered
/// here are dropped again on every path before returning, so consecutive
/// evaluations see exactly their own configuration.
pub fn evaluate_index_conf_cost(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    conf: &Set<Index>,
) -> Result<IndexConfCost> {
    let mut created: Vec<&Index> = Vec::with_capacity(conf.len());
    let outcome = explain_workload(workload, optimizer, conf, &mut created);

    let mut drop_error: Option<Error> = None;
    for index in created {
        if let Err(e) = optimizer.drop_hypo_index(index) {
            warn!(index = %index.key(), error = %e, "failed to drop hypothetical index");
            if drop_error.is_none() {
                drop_error = Some(e);
            }
        }
    }

    let total_cost = outcome?;
    if let Some(e) = drop_error {
        return Err(e);
    }

    let total_columns = conf.iter().map(|index| index.columns.len()).sum();
    Ok(IndexConfCost::new(total_cost, total_columns))
}

fn explain_workload<'a>(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    conf: &'a Set<Index>,
    created: &mut Vec<&'a Index>,
) -> Result<f64> {
    for index in conf.iter() {
        optimizer.create_hypo_index(index)?;
        created.push(index);
    }
    let mut total = 0.0;
    for sql in workload.sqls.iter() {
        if sql.sql_type() != SqlType::Select {
            continue;
        }
        let plan = optimizer.explain(&sql.text)?;
        total += plan.plan_cost()? * sql.frequency.max(1) as f64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexpilot_analyzer::select_indexable_columns;
    use indexpilot_whatif::MockOptimizer;
    use indexpilot_workload::create_workload_from_raw_stmts;

    fn analyzed(tables: &[&str], sqls: &[&str]) -> WorkloadInfo {
        let tables: Vec<String> = tables.iter().map(|s| s.to_string()).collect();
        let sqls: Vec<String> = sqls.iter().map(|s| s.to_string()).collect();
        let mut workload = create_workload_from_raw_stmts("test", &tables, &sqls).unwrap();
        select_indexable_columns(&mut workload).unwrap();
        workload
    }

    #[test]
    fn test_hypo_indexes_are_dropped_after_evaluation() {
        let workload = analyzed(
            &["create table t (a int, b int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        let conf = Set::from_list([
            Index::new("test", "t", "idx_a", &["a"]),
            Index::new("test", "t", "idx_b", &["b"]),
        ]);
        let cost = evaluate_index_conf_cost(&workload, &mut optimizer, &conf).unwrap();
        assert_eq!(cost.total_number_of_index_columns, 2);
        assert_eq!(optimizer.active_hypo_count(), 0);
    }

    #[test]
    fn test_frequency_multiplies_cost() {
        let mut workload = analyzed(
            &["create table t (a int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        let base = evaluate_index_conf_cost(&workload, &mut optimizer, &Set::new()).unwrap();

        let mut sql = workload.sqls.to_list().remove(0);
        sql.frequency = 5;
        workload.sqls.insert(sql);
        let weighted = evaluate_index_conf_cost(&workload, &mut optimizer, &Set::new()).unwrap();
        assert_eq!(
            weighted.total_workload_query_cost,
            base.total_workload_query_cost * 5.0
        );
    }

    #[test]
    fn test_only_selects_are_explained() {
        let workload = analyzed(
            &["create table t (a int)"],
            &[
                "select * from t where a = 1",
                "insert into t values (1)",
                "update t set a = 2 where a = 1",
                "delete from t where a = 3",
            ],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        evaluate_index_conf_cost(&workload, &mut optimizer, &Set::new()).unwrap();
        assert_eq!(optimizer.explain_count(), 1);
    }

    #[test]
    fn test_explain_failure_still_drops_hypo_indexes() {
        let workload = analyzed(
            &["create table t (a int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        optimizer.fail_explains(true);
        let conf = Set::from_list([Index::new("test", "t", "idx_a", &["a"])]);
        let result = evaluate_index_conf_cost(&workload, &mut optimizer, &conf);
        assert!(matches!(result, Err(Error::Optimizer(_))));
        assert_eq!(optimizer.active_hypo_count(), 0);
    }

    #[test]
    fn test_empty_configuration_reports_zero_columns() {
        let workload = analyzed(
            &["create table t (a int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        let cost = evaluate_index_conf_cost(&workload, &mut optimizer, &Set::new()).unwrap();
        assert_eq!(cost.total_number_of_index_columns, 0);
        assert!(cost.total_workload_query_cost > 0.0);
    }
}
