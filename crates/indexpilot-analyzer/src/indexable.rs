//! Indexable-column selection

use crate::scope::{walk_statement, ScopeNode, ScopeTable};
use indexpilot_common::{Result, Set};
use indexpilot_workload::{Column, Sql, SqlType, TableSchema, WorkloadInfo};
use tracing::{debug, warn};

/// Populate every statement's indexable-column set and the workload-level
/// union of them.
///
/// Statements that fail to parse are skipped with a warning; column
/// references that cannot be resolved unambiguously against the known
/// schemas are dropped silently. That is the analyzer's contract - callers
/// wanting strict resolution must pre-validate.
pub fn select_indexable_columns(workload: &mut WorkloadInfo) -> Result<()> {
    let mut union = Set::new();
    let mut analyzed = Vec::new();
    for mut statement in workload.sqls.to_list() {
        if matches!(
            statement.sql_type(),
            SqlType::Select | SqlType::Insert | SqlType::Update
        ) {
            match indexable_columns_of(&statement, &workload.table_schemas) {
                Ok(columns) => statement.indexable_columns = columns,
                Err(e) => {
                    warn!(sql = %statement.text, error = %e, "skipping unparseable statement")
                }
            }
        }
        union.add_set(&statement.indexable_columns);
        analyzed.push(statement);
    }
    workload.sqls = Set::from_list(analyzed);
    workload.indexable_columns = union;
    Ok(())
}

fn indexable_columns_of(statement: &Sql, schemas: &Set<TableSchema>) -> Result<Set<Column>> {
    let parsed = indexpilot_parser::parse_statement(&statement.text)?;
    let scope = walk_statement(&statement.schema_name, &parsed);
    let mut resolved = Set::new();
    resolve_node(&scope, &[], schemas, &mut resolved);
    Ok(resolved)
}

/// Resolve one scope level, then descend; children see this level as an
/// ancestor (correlated references are legal SQL).
fn resolve_node(
    node: &ScopeNode,
    ancestors: &[&ScopeNode],
    schemas: &Set<TableSchema>,
    resolved: &mut Set<Column>,
) {
    for reference in &node.column_refs {
        match resolve_reference(reference, node, ancestors, schemas) {
            Some(column) => resolved.insert(column),
            None => debug!(
                reference = reference.join("."),
                "dropping unresolvable column reference"
            ),
        }
    }
    let mut chain: Vec<&ScopeNode> = ancestors.to_vec();
    chain.push(node);
    for child in &node.children {
        resolve_node(child, &chain, schemas, resolved);
    }
}

/// Resolve one raw identifier path, innermost scope first. Returns `None`
/// when the reference is unknown everywhere or ambiguous at the level that
/// first matches it.
fn resolve_reference(
    reference: &[String],
    node: &ScopeNode,
    ancestors: &[&ScopeNode],
    schemas: &Set<TableSchema>,
) -> Option<Column> {
    let levels = std::iter::once(node).chain(ancestors.iter().rev().copied());
    for level in levels {
        match resolve_at_level(reference, &level.tables, schemas) {
            Resolution::Found(column) => return Some(column),
            Resolution::Ambiguous => return None,
            Resolution::NotFound => continue,
        }
    }
    None
}

enum Resolution {
    Found(Column),
    Ambiguous,
    NotFound,
}

fn resolve_at_level(
    reference: &[String],
    tables: &[ScopeTable],
    schemas: &Set<TableSchema>,
) -> Resolution {
    match reference {
        [column] => {
            let column = column.to_lowercase();
            let mut found: Option<Column> = None;
            for table in tables {
                if !table_has_column(schemas, &table.schema_name, &table.table_name, &column) {
                    continue;
                }
                let candidate = Column::new(&table.schema_name, &table.table_name, &column);
                match &found {
                    Some(existing) if *existing != candidate => return Resolution::Ambiguous,
                    _ => found = Some(candidate),
                }
            }
            match found {
                Some(column) => Resolution::Found(column),
                None => Resolution::NotFound,
            }
        }
        [qualifier, column] => {
            let qualifier = qualifier.to_lowercase();
            let column = column.to_lowercase();
            for table in tables {
                let matches = match &table.alias {
                    Some(alias) => *alias == qualifier,
                    None => table.table_name == qualifier,
                };
                if matches
                    && table_has_column(schemas, &table.schema_name, &table.table_name, &column)
                {
                    return Resolution::Found(Column::new(
                        &table.schema_name,
                        &table.table_name,
                        &column,
                    ));
                }
            }
            Resolution::NotFound
        }
        [schema, table, column] => {
            let schema = schema.to_lowercase();
            let table = table.to_lowercase();
            let column = column.to_lowercase();
            let in_scope = tables
                .iter()
                .any(|t| t.schema_name == schema && t.table_name == table);
            if in_scope && table_has_column(schemas, &schema, &table, &column) {
                return Resolution::Found(Column::new(&schema, &table, &column));
            }
            Resolution::NotFound
        }
        _ => Resolution::NotFound,
    }
}

fn table_has_column(
    schemas: &Set<TableSchema>,
    schema_name: &str,
    table_name: &str,
    column_name: &str,
) -> bool {
    schemas
        .get(&format!("{}.{}", schema_name, table_name))
        .map(|table| table.column(column_name).is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexpilot_workload::create_workload_from_raw_stmts;

    fn analyzed(tables: &[&str], sqls: &[&str]) -> WorkloadInfo {
        let tables: Vec<String> = tables.iter().map(|s| s.to_string()).collect();
        let sqls: Vec<String> = sqls.iter().map(|s| s.to_string()).collect();
        let mut workload = create_workload_from_raw_stmts("test", &tables, &sqls).unwrap();
        select_indexable_columns(&mut workload).unwrap();
        workload
    }

    #[test]
    fn test_where_equality_and_range() {
        let w = analyzed(
            &["create table t (a int, b int, c int)"],
            &["select * from t where a = 1 and b > 2"],
        );
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a", "test.t.b"]);
    }

    #[test]
    fn test_in_between_like_subjects() {
        let w = analyzed(
            &["create table t (a int, b int, c int, d varchar(10))"],
            &["select * from t where a in (1, 2) and b between 1 and 5 and d like 'x%'"],
        );
        assert_eq!(
            w.indexable_columns.keys(),
            vec!["test.t.a", "test.t.b", "test.t.d"]
        );
    }

    #[test]
    fn test_join_keys_with_aliases() {
        let w = analyzed(
            &[
                "create table t1 (id int, x int)",
                "create table t2 (id int, y int)",
            ],
            &["select * from t1 a join t2 b on a.id = b.id where b.y = 3"],
        );
        assert_eq!(
            w.indexable_columns.keys(),
            vec!["test.t1.id", "test.t2.id", "test.t2.y"]
        );
    }

    #[test]
    fn test_group_by_order_by_having() {
        let w = analyzed(
            &["create table t (a int, b int, c int)"],
            &["select a, count(*) from t group by a having max(c) > 1 order by b"],
        );
        // max(c) is not a direct column reference, so HAVING contributes
        // nothing here; GROUP BY and ORDER BY do.
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a", "test.t.b"]);
    }

    #[test]
    fn test_unresolvable_columns_are_dropped() {
        let w = analyzed(
            &["create table t (a int)"],
            &["select * from t where a = 1 and nosuch = 2"],
        );
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a"]);
    }

    #[test]
    fn test_ambiguous_unqualified_column_is_dropped() {
        let w = analyzed(
            &[
                "create table t1 (id int, x int)",
                "create table t2 (id int)",
            ],
            &["select * from t1, t2 where id = 1 and x = 2"],
        );
        // `id` exists in both tables and carries no qualifier
        assert_eq!(w.indexable_columns.keys(), vec!["test.t1.x"]);
    }

    #[test]
    fn test_update_and_insert_statements() {
        let w = analyzed(
            &["create table t (a int, b int)", "create table s (a int)"],
            &[
                "update t set b = 0 where a = 5",
                "insert into s select a from t where b = 7",
            ],
        );
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a", "test.t.b"]);

        let update = w.sqls.get("update t set b = 0 where a = 5").unwrap();
        assert_eq!(update.indexable_columns.keys(), vec!["test.t.a"]);
    }

    #[test]
    fn test_unparseable_statement_is_skipped() {
        let w = analyzed(
            &["create table t (a int)"],
            &[
                "select * from t where a = 1",
                "select * from where broken ???",
            ],
        );
        // the broken statement stays in the workload with no columns
        assert_eq!(w.sqls.len(), 2);
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a"]);
    }

    #[test]
    fn test_subquery_and_union_are_walked() {
        let w = analyzed(
            &["create table t (a int, b int)", "create table s (a int)"],
            &[
                "select * from t where a in (select a from s where a > 0)",
                "select * from t where a = 1 union select * from t where b = 2",
            ],
        );
        assert_eq!(
            w.indexable_columns.keys(),
            vec!["test.s.a", "test.t.a", "test.t.b"]
        );
    }

    #[test]
    fn test_schema_qualified_reference() {
        let w = analyzed(
            &["create table t (a int)"],
            &["select * from test.t where test.t.a = 1"],
        );
        assert_eq!(w.indexable_columns.keys(), vec!["test.t.a"]);
    }
}
