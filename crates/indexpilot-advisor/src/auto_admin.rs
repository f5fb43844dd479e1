//! AutoAdmin selection
//!
//! Per index width: generate candidates, pick a configuration of up to K
//! via enumerate-greedy, keep the best configuration seen across widths,
//! then widen the candidates by extending the chosen configuration. A final
//! pass drops members whose removal does not make the configuration
//! meaningfully worse.
//!
//! Determinism: candidate sets iterate in key order and a configuration is
//! only replaced when it is strictly `less`, so equal-cost ties go to fewer
//! index columns and then to the lexicographically smaller key.

use indexpilot_common::{comb_set, Keyed, Result, Set};
use indexpilot_whatif::WhatIfOptimizer;
use indexpilot_workload::{Index, IndexConfCost, WorkloadInfo};
use tracing::debug;

use crate::candidate::{extend_candidates, single_column_candidates};
use crate::cost::evaluate_index_conf_cost;
use crate::Parameter;

/// Select up to `parameter.max_indexes_to_recommend` indexes minimizing the
/// estimated workload cost. May return fewer than K indexes, or none at all
/// when no candidate helps.
pub fn select_indexes(
    workload: &WorkloadInfo,
    parameter: Parameter,
    optimizer: &mut dyn WhatIfOptimizer,
) -> Result<Set<Index>> {
    let k = parameter.max_indexes_to_recommend;
    let mut best_conf = Set::new();
    let mut best_cost = IndexConfCost::default();

    let mut candidates = single_column_candidates(workload);
    for width in 1..=parameter.max_columns_per_index {
        if candidates.is_empty() {
            break;
        }
        debug!(width, candidates = candidates.len(), "searching width");
        let conf = enumerate_greedy(
            workload,
            optimizer,
            &candidates,
            k,
            parameter.naive_enumeration_threshold,
        )?;
        let cost = evaluate_index_conf_cost(workload, optimizer, &conf)?;
        debug!(
            width,
            cost = cost.total_workload_query_cost,
            indexes = conf.len(),
            "width searched"
        );
        if cost.less(&best_cost) {
            best_conf = conf.clone();
            best_cost = cost;
        }
        candidates = extend_candidates(workload, &conf);
    }

    drop_redundant(workload, optimizer, &mut best_conf, &mut best_cost)?;
    Ok(best_conf)
}

/// Pick a configuration of up to `k` indexes out of `candidates`. Small
/// candidate sets are enumerated exhaustively; larger ones start from the
/// best `naive`-sized subset and grow greedily while cost improves.
fn enumerate_greedy(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    candidates: &Set<Index>,
    k: usize,
    naive: usize,
) -> Result<Set<Index>> {
    if candidates.len() <= naive + k {
        return best_subset_up_to(workload, optimizer, candidates, k);
    }

    // the seed may not exceed the recommendation budget
    let seed_size = naive.min(k);
    let mut current = best_subset_exact(workload, optimizer, candidates, seed_size)?;
    let mut current_cost = evaluate_index_conf_cost(workload, optimizer, &current)?;
    while current.len() < k {
        let mut best_addition: Option<(Index, IndexConfCost)> = None;
        for candidate in candidates.difference(&current).iter() {
            let mut trial = current.clone();
            trial.insert(candidate.clone());
            let trial_cost = evaluate_index_conf_cost(workload, optimizer, &trial)?;
            let improves = match &best_addition {
                Some((_, best)) => trial_cost.less(best),
                None => true,
            };
            if improves {
                best_addition = Some((candidate.clone(), trial_cost));
            }
        }
        match best_addition {
            Some((index, cost)) if cost.less(&current_cost) => {
                current.insert(index);
                current_cost = cost;
            }
            _ => break,
        }
    }
    Ok(current)
}

/// Cheapest subset of size 1..=k, by exhaustive enumeration.
fn best_subset_up_to(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    candidates: &Set<Index>,
    k: usize,
) -> Result<Set<Index>> {
    let mut best = Set::new();
    let mut best_cost = IndexConfCost::default();
    for size in 1..=k.min(candidates.len()) {
        for subset in comb_set(candidates, size) {
            let cost = evaluate_index_conf_cost(workload, optimizer, &subset)?;
            if cost.less(&best_cost) {
                best = subset;
                best_cost = cost;
            }
        }
    }
    Ok(best)
}

/// Cheapest subset of exactly `size`, by exhaustive enumeration.
fn best_subset_exact(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    candidates: &Set<Index>,
    size: usize,
) -> Result<Set<Index>> {
    let mut best = Set::new();
    let mut best_cost = IndexConfCost::default();
    for subset in comb_set(candidates, size) {
        let cost = evaluate_index_conf_cost(workload, optimizer, &subset)?;
        if cost.less(&best_cost) {
            best = subset;
            best_cost = cost;
        }
    }
    Ok(best)
}

/// Drop members whose removal does not make the configuration meaningfully
/// worse. The fuzzy cost ordering prefers fewer index columns on near-equal
/// cost, so removing a redundant member compares as an improvement. The
/// last member is never dropped: an empty configuration carries the
/// uninitialized sentinel cost and compares worse than anything.
fn drop_redundant(
    workload: &WorkloadInfo,
    optimizer: &mut dyn WhatIfOptimizer,
    conf: &mut Set<Index>,
    cost: &mut IndexConfCost,
) -> Result<()> {
    loop {
        let mut dropped = false;
        for index in conf.to_list() {
            let mut reduced = conf.clone();
            reduced.remove(&index);
            if reduced.is_empty() {
                continue;
            }
            let reduced_cost = evaluate_index_conf_cost(workload, optimizer, &reduced)?;
            if reduced_cost.less(cost) {
                debug!(index = %index.key(), "dropping redundant index");
                *conf = reduced;
                *cost = reduced_cost;
                dropped = true;
                break;
            }
        }
        if !dropped {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{advise, AdvisorResult};
    use indexpilot_analyzer::select_indexable_columns;
    use indexpilot_common::Error;
    use indexpilot_whatif::MockOptimizer;
    use indexpilot_workload::create_workload_from_raw_stmts;

    fn analyzed(tables: &[&str], sqls: &[&str]) -> WorkloadInfo {
        let tables: Vec<String> = tables.iter().map(|s| s.to_string()).collect();
        let sqls: Vec<String> = sqls.iter().map(|s| s.to_string()).collect();
        let mut workload = create_workload_from_raw_stmts("test", &tables, &sqls).unwrap();
        select_indexable_columns(&mut workload).unwrap();
        workload
    }

    fn run(tables: &[&str], sqls: &[&str], k: usize) -> (AdvisorResult, MockOptimizer) {
        let workload = analyzed(tables, sqls);
        let mut optimizer = MockOptimizer::new(&workload);
        let result = advise(&workload, Parameter::new(k), &mut optimizer).unwrap();
        (result, optimizer)
    }

    fn recommended_keys(result: &AdvisorResult) -> Vec<String> {
        result.recommended_indexes.keys()
    }

    #[test]
    fn test_single_query_single_index() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &["select * from t where a = 1"],
            1,
        );
        assert_eq!(recommended_keys(&result), vec!["test.t(a)"]);
    }

    #[test]
    fn test_budget_larger_than_useful_candidates() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &["select * from t where a = 1"],
            2,
        );
        // only one index is worth anything, even though two were allowed
        assert_eq!(recommended_keys(&result), vec!["test.t(a)"]);
    }

    #[test]
    fn test_widens_to_two_column_index() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &[
                "select * from t where a = 1",
                "select * from t where a = 2",
                "select * from t where b = 1 and a = 1",
            ],
            1,
        );
        assert_eq!(recommended_keys(&result), vec!["test.t(a,b)"]);
    }

    #[test]
    fn test_minimality_drops_second_index() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &[
                "select * from t where a = 1",
                "select * from t where a = 2",
                "select * from t where b = 1 and a = 1",
            ],
            2,
        );
        // (a,b) serves all three statements; a second index adds columns
        // without meaningfully lowering cost
        assert_eq!(recommended_keys(&result), vec!["test.t(a,b)"]);
    }

    #[test]
    fn test_existing_index_preempts_candidate() {
        let (result, _) = run(
            &["create table t (a int, b int, c int, key(a))"],
            &[
                "select * from t where a = 1",
                "select * from t where a = 2",
                "select * from t where b = 1",
            ],
            1,
        );
        assert_eq!(recommended_keys(&result), vec!["test.t(b)"]);
    }

    #[test]
    fn test_two_single_column_indexes_with_large_budget() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &[
                "select * from t where a = 1",
                "select * from t where a = 2",
                "select * from t where b = 1",
            ],
            10,
        );
        assert_eq!(recommended_keys(&result), vec!["test.t(a)", "test.t(b)"]);
    }

    #[test]
    fn test_recommendation_improves_reported_cost() {
        let (result, _) = run(
            &["create table t (a int, b int, c int)"],
            &["select * from t where a = 1"],
            1,
        );
        assert!(
            result.optimized_cost.total_workload_query_cost
                < result.original_cost.total_workload_query_cost
        );
        assert_eq!(
            result.ddl_statements(),
            vec!["CREATE INDEX idx_a ON test.t (a)".to_string()]
        );
    }

    #[test]
    fn test_workload_without_indexable_columns() {
        let (result, _) = run(
            &["create table t (a int)"],
            &["insert into t values (1)"],
            1,
        );
        assert!(result.recommended_indexes.is_empty());
    }

    #[test]
    fn test_fully_covered_workload_recommends_nothing() {
        let (result, _) = run(
            &["create table t (a int, b int, primary key (a))"],
            &["select * from t where a = 1"],
            1,
        );
        assert!(result.recommended_indexes.is_empty());
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        let workload = analyzed(
            &["create table t (a int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        let result = advise(&workload, Parameter::new(0), &mut optimizer);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let tables = ["create table t (a int, b int, c int, d int, e int)"];
        let sqls = [
            "select * from t where a = 1 and c = 1",
            "select * from t where b = 1 and e = 1",
            "select * from t where d > 10",
        ];
        let (first, _) = run(&tables, &sqls, 2);
        let (second, _) = run(&tables, &sqls, 2);
        assert_eq!(recommended_keys(&first), recommended_keys(&second));
    }

    #[test]
    fn test_every_evaluation_pairs_create_and_drop() {
        let (_, optimizer) = run(
            &["create table t (a int, b int, c int)"],
            &[
                "select * from t where a = 1",
                "select * from t where b = 1 and a = 1",
            ],
            2,
        );
        assert_eq!(optimizer.active_hypo_count(), 0);
    }

    #[test]
    fn test_optimizer_error_propagates_and_cleans_up() {
        let workload = analyzed(
            &["create table t (a int, b int)"],
            &["select * from t where a = 1"],
        );
        let mut optimizer = MockOptimizer::new(&workload);
        optimizer.fail_explains(true);
        let result = advise(&workload, Parameter::new(1), &mut optimizer);
        assert!(matches!(result, Err(Error::Optimizer(_))));
        assert_eq!(optimizer.active_hypo_count(), 0);
    }

    #[test]
    fn test_greedy_path_beyond_naive_threshold() {
        // six candidate columns force the greedy branch (6 > naive 2 + k 3):
        // the seed is the best exhaustive pair, the third comes greedily
        let tables = ["create table t (a int, b int, c int, d int, e int, f int)"];
        let sqls = [
            "select * from t where a = 1",
            "select * from t where b = 1",
            "select * from t where c = 1",
            "select * from t where d = 1",
            "select * from t where e = 1",
            "select * from t where f = 1",
        ];
        let (result, _) = run(&tables, &sqls, 3);
        // all candidates are symmetric; the deterministic tie-break keeps
        // the lexicographically smallest ones
        assert_eq!(
            recommended_keys(&result),
            vec!["test.t(a)", "test.t(b)", "test.t(c)"]
        );
    }
}
