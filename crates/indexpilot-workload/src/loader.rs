//! Workload construction
//!
//! Workloads come from two places: in-memory raw statements (tests,
//! embedding callers) or a workload directory with `schema.sql`,
//! `queries.sql` or `queries/*.sql`, an optional `frequency.txt` and an
//! optional `stats/` directory of exported table statistics.

use crate::{Column, Index, Sql, TableSchema, TableStats, WorkloadInfo};
use indexpilot_common::{Error, Result, Set};
use serde::Deserialize;
use sqlparser::ast as sql;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Build a workload from in-memory CREATE TABLE statements and query texts.
/// Every query gets frequency 1; unqualified table names resolve against
/// `schema_name`.
pub fn create_workload_from_raw_stmts(
    schema_name: &str,
    create_table_stmts: &[String],
    raw_sqls: &[String],
) -> Result<WorkloadInfo> {
    let mut workload = WorkloadInfo::default();
    for stmt in create_table_stmts {
        workload
            .table_schemas
            .insert(parse_create_table(schema_name, stmt)?);
    }
    for text in raw_sqls {
        workload.sqls.insert(Sql::new(schema_name, text));
    }
    Ok(workload)
}

/// Parse one CREATE TABLE statement into a `TableSchema`, including the
/// physical indexes it declares (primary key, unique constraints,
/// `KEY`/`INDEX` definitions).
pub fn parse_create_table(default_schema: &str, stmt_text: &str) -> Result<TableSchema> {
    let statement = indexpilot_parser::parse_statement(stmt_text)?;
    let sql::Statement::CreateTable(create) = statement else {
        return Err(Error::Parse(format!(
            "not a CREATE TABLE statement: {}",
            stmt_text
        )));
    };

    let (schema_name, table_name) = split_object_name(&create.name, default_schema);

    let mut columns = Vec::new();
    let mut indexes = Vec::new();
    for def in &create.columns {
        columns.push(Column::new(&schema_name, &table_name, &def.name.value));
        for opt in &def.options {
            if let sql::ColumnOption::Unique { is_primary, .. } = &opt.option {
                let index_name = if *is_primary {
                    "primary".to_string()
                } else {
                    format!("uniq_{}", def.name.value.to_lowercase())
                };
                indexes.push(Index::new(
                    &schema_name,
                    &table_name,
                    &index_name,
                    &[def.name.value.as_str()],
                ));
            }
        }
    }

    for constraint in &create.constraints {
        let (name, cols) = match constraint {
            sql::TableConstraint::PrimaryKey { columns, .. } => {
                (Some("primary".to_string()), columns)
            }
            sql::TableConstraint::Unique { name, columns, .. } => {
                (name.as_ref().map(|n| n.value.clone()), columns)
            }
            sql::TableConstraint::Index { name, columns, .. } => {
                (name.as_ref().map(|n| n.value.clone()), columns)
            }
            _ => continue,
        };
        let column_names: Vec<&str> = cols.iter().map(|c| c.value.as_str()).collect();
        if column_names.is_empty() {
            continue;
        }
        let index_name =
            name.unwrap_or_else(|| format!("idx_{}", column_names.join("_").to_lowercase()));
        indexes.push(Index::new(
            &schema_name,
            &table_name,
            &index_name,
            &column_names,
        ));
    }

    Ok(TableSchema::new(
        &schema_name,
        &table_name,
        columns,
        indexes,
        stmt_text,
    ))
}

fn split_object_name(name: &sql::ObjectName, default_schema: &str) -> (String, String) {
    let parts = &name.0;
    let table = parts
        .last()
        .map(|i| i.value.to_lowercase())
        .unwrap_or_default();
    let schema = if parts.len() >= 2 {
        parts[parts.len() - 2].value.to_lowercase()
    } else {
        default_schema.to_lowercase()
    };
    (schema, table)
}

/// Load a workload directory:
///
/// - `schema.sql`: CREATE TABLE statements, `;`-separated (other statements
///   such as `use` or `create database` are ignored)
/// - `queries.sql` or `queries/*.sql` (one query per file, alias = stem)
/// - `frequency.txt` (optional): `<alias> <count>` per line
/// - `stats/*.json` (optional): exported table statistics
pub fn load_workload_info(schema_name: &str, dir: &Path) -> Result<WorkloadInfo> {
    let mut workload = WorkloadInfo::default();

    let schema_text = fs::read_to_string(dir.join("schema.sql"))?;
    for stmt in indexpilot_parser::split_raw_statements(&schema_text) {
        if !stmt.to_lowercase().starts_with("create table") {
            continue;
        }
        match parse_create_table(schema_name, &stmt) {
            Ok(table) => {
                workload.table_schemas.insert(table);
            }
            Err(e) => warn!(statement = %stmt, error = %e, "skipping unparseable schema statement"),
        }
    }

    load_queries(schema_name, dir, &mut workload)?;

    let frequency_path = dir.join("frequency.txt");
    if frequency_path.exists() {
        apply_frequencies(&frequency_path, &mut workload)?;
    }

    let stats_dir = dir.join("stats");
    if stats_dir.is_dir() {
        load_table_stats(&stats_dir, &mut workload)?;
    }

    Ok(workload)
}

fn load_queries(schema_name: &str, dir: &Path, workload: &mut WorkloadInfo) -> Result<()> {
    let queries_file = dir.join("queries.sql");
    let queries_dir = dir.join("queries");

    if queries_file.exists() {
        let text = fs::read_to_string(&queries_file)?;
        for stmt in indexpilot_parser::split_raw_statements(&text) {
            workload.sqls.insert(Sql::new(schema_name, &stmt));
        }
        return Ok(());
    }

    if queries_dir.is_dir() {
        for path in sorted_files_with_extension(&queries_dir, "sql")? {
            let text = fs::read_to_string(&path)?;
            let alias = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            for stmt in indexpilot_parser::split_raw_statements(&text) {
                let mut query = Sql::new(schema_name, &stmt);
                query.alias = alias.clone();
                workload.sqls.insert(query);
            }
        }
        return Ok(());
    }

    Err(Error::Workload(format!(
        "no queries.sql or queries/ under {}",
        dir.display()
    )))
}

fn apply_frequencies(path: &Path, workload: &mut WorkloadInfo) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let mut queries = workload.sqls.to_list();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(alias), Some(count)) = (fields.next(), fields.next()) else {
            warn!(line, "malformed frequency line");
            continue;
        };
        let Ok(frequency) = count.parse::<u64>() else {
            warn!(line, "malformed frequency count");
            continue;
        };
        let mut matched = false;
        for query in queries.iter_mut() {
            if query.alias == alias {
                query.frequency = frequency.max(1);
                matched = true;
            }
        }
        if !matched {
            warn!(alias, "frequency entry matches no query");
        }
    }
    workload.sqls = Set::from_list(queries);
    Ok(())
}

/// The part of an exported stats dump that identifies its table.
#[derive(Debug, Deserialize)]
struct StatsHeader {
    database_name: String,
    table_name: String,
}

fn load_table_stats(stats_dir: &Path, workload: &mut WorkloadInfo) -> Result<()> {
    for path in sorted_files_with_extension(stats_dir, "json")? {
        let text = fs::read_to_string(&path)?;
        match serde_json::from_str::<StatsHeader>(&text) {
            Ok(header) => {
                workload.table_stats.insert(TableStats::new(
                    &header.database_name,
                    &header.table_name,
                    path,
                ));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable stats file"),
        }
    }
    Ok(())
}

fn sorted_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    paths.sort();
    Ok(paths)
}
