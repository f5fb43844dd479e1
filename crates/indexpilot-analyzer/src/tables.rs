//! Table-name collection

use crate::scope::walk_statement;
use indexpilot_common::{Result, Set};
use indexpilot_workload::TableName;

/// All tables the SQL touches, resolved from FROM/JOIN clauses (including
/// comma joins), across subqueries and set operations. Unqualified names
/// take `default_schema`.
pub fn collect_table_names(default_schema: &str, sql_text: &str) -> Result<Set<TableName>> {
    let mut names = Set::new();
    for statement in indexpilot_parser::parse_sql(sql_text)? {
        let scope = walk_statement(default_schema, &statement);
        for table in scope.all_tables() {
            names.insert(TableName::new(&table.schema_name, &table.table_name));
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_join_query() {
        let sql = "
SELECT MIN(mc.note) AS production_note, MIN(t.title) AS movie_title
    , MIN(t.production_year) AS movie_year
FROM company_type ct, info_type it, movie_companies mc, movie_info_idx mi_idx, title t
WHERE ct.kind = 'production companies'
    AND it.info = 'top 250 rank'
    AND mc.note NOT LIKE '%(as Metro-Goldwyn-Mayer Pictures)%'
    AND (mc.note LIKE '%(co-production)%'
        OR mc.note LIKE '%(presents)%')
    AND ct.id = mc.company_type_id
    AND t.id = mc.movie_id
    AND t.id = mi_idx.movie_id
    AND mc.movie_id = mi_idx.movie_id
    AND it.id = mi_idx.info_type_id;
";
        let names = collect_table_names("imdbload", sql).unwrap();
        assert_eq!(
            names.keys(),
            vec![
                "imdbload.company_type",
                "imdbload.info_type",
                "imdbload.movie_companies",
                "imdbload.movie_info_idx",
                "imdbload.title",
            ]
        );
    }

    #[test]
    fn test_joins_and_subqueries() {
        let names = collect_table_names(
            "test",
            "select * from t1 join t2 on t1.a = t2.a where t1.b in (select b from t3)",
        )
        .unwrap();
        assert_eq!(names.keys(), vec!["test.t1", "test.t2", "test.t3"]);
    }

    #[test]
    fn test_qualified_table_keeps_its_schema() {
        let names = collect_table_names("test", "select * from other.t where a = 1").unwrap();
        assert_eq!(names.keys(), vec!["other.t"]);
    }

    #[test]
    fn test_update_and_insert_targets() {
        let names = collect_table_names("test", "update t set a = 1 where b = 2").unwrap();
        assert_eq!(names.keys(), vec!["test.t"]);
        let names =
            collect_table_names("test", "insert into s select * from t where a = 1").unwrap();
        assert_eq!(names.keys(), vec!["test.s", "test.t"]);
    }
}
