//! indexpilot CLI
//!
//! `advise` loads a workload directory, connects to a TiDB-compatible
//! database and prints the recommended indexes with the cost improvement.
//! `inspect` parses a workload directory offline and prints what the
//! advisor would see.

use clap::{Parser, Subcommand};
use indexpilot::advisor;
use indexpilot::analyzer::select_indexable_columns;
use indexpilot::common::Keyed;
use indexpilot::whatif::{TidbWhatIfOptimizer, WhatIfOptimizer};
use indexpilot::workload::{load_workload_info, SqlType, WorkloadInfo};
use indexpilot::{Parameter, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "indexpilot")]
#[command(about = "Cost-guided secondary-index advisor for TiDB-compatible databases", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend indexes for a workload against a running database
    Advise {
        /// Workload directory (schema.sql plus queries.sql or queries/)
        #[arg(short, long)]
        workload: PathBuf,

        /// Database DSN, e.g. mysql://root@127.0.0.1:4000/
        #[arg(short, long)]
        dsn: String,

        /// Default schema for unqualified table names
        #[arg(short, long, default_value = "test")]
        schema: String,

        /// Maximum number of indexes to recommend
        #[arg(long, default_value_t = 3)]
        max_indexes: usize,

        /// Maximum number of columns per recommended index
        #[arg(long, default_value_t = 3)]
        max_width: usize,

        /// Replay the workload's CREATE TABLE statements first
        #[arg(long)]
        setup_schema: bool,
    },

    /// Parse a workload directory and print what the advisor would see
    Inspect {
        /// Workload directory (schema.sql plus queries.sql or queries/)
        #[arg(short, long)]
        workload: PathBuf,

        /// Default schema for unqualified table names
        #[arg(short, long, default_value = "test")]
        schema: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Advise {
            workload,
            dsn,
            schema,
            max_indexes,
            max_width,
            setup_schema,
        } => advise(workload, dsn, schema, max_indexes, max_width, setup_schema),
        Commands::Inspect { workload, schema } => inspect(workload, schema),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn advise(
    workload_dir: PathBuf,
    dsn: String,
    schema: String,
    max_indexes: usize,
    max_width: usize,
    setup_schema: bool,
) -> Result<()> {
    let mut workload = load_workload_info(&schema, &workload_dir)?;
    select_indexable_columns(&mut workload)?;
    info!(
        queries = workload.sqls.len(),
        tables = workload.table_schemas.len(),
        indexable_columns = workload.indexable_columns.len(),
        "workload loaded"
    );

    let mut optimizer = TidbWhatIfOptimizer::connect(&dsn)?;
    if setup_schema {
        replay_schema(&workload, &mut optimizer)?;
    }

    let mut parameter = Parameter::new(max_indexes);
    parameter.max_columns_per_index = max_width;
    let result = advisor::advise(&workload, parameter, &mut optimizer)?;
    optimizer.close()?;

    println!(
        "original cost:  {:.2E}",
        result.original_cost.total_workload_query_cost
    );
    println!(
        "optimized cost: {:.2E}",
        result.optimized_cost.total_workload_query_cost
    );
    if result.recommended_indexes.is_empty() {
        println!("no index recommended");
    } else {
        println!("recommended indexes:");
        for ddl in result.ddl_statements() {
            println!("  {};", ddl);
        }
    }
    Ok(())
}

fn replay_schema(workload: &WorkloadInfo, optimizer: &mut TidbWhatIfOptimizer) -> Result<()> {
    for schema_name in workload.all_schema_names() {
        optimizer.execute(&format!("CREATE DATABASE IF NOT EXISTS {}", schema_name))?;
    }
    for table in workload.table_schemas.iter() {
        optimizer.execute(&format!("USE {}", table.schema_name))?;
        if let Err(e) = optimizer.execute(&table.create_stmt_text) {
            warn!(table = %table.key(), error = %e, "create table failed, assuming it exists");
        }
    }
    Ok(())
}

fn inspect(workload_dir: PathBuf, schema: String) -> Result<()> {
    let mut workload = load_workload_info(&schema, &workload_dir)?;
    select_indexable_columns(&mut workload)?;

    println!("tables: {}", workload.table_schemas.len());
    for table in workload.table_schemas.iter() {
        println!(
            "  {} ({} columns, {} indexes)",
            table.key(),
            table.columns.len(),
            table.indexes.len()
        );
    }

    println!("queries: {}", workload.sqls.len());
    for query in workload.sqls.iter() {
        let kind = match query.sql_type() {
            SqlType::Select => "select",
            SqlType::Insert => "insert",
            SqlType::Update => "update",
            SqlType::Others => "other",
        };
        let alias = if query.alias.is_empty() {
            "-"
        } else {
            query.alias.as_str()
        };
        println!(
            "  [{}] {} x{}: {}",
            kind, alias, query.frequency, query.text
        );
    }

    println!("indexable columns: {}", workload.indexable_columns.len());
    for column in workload.indexable_columns.iter() {
        println!("  {}", column);
    }
    Ok(())
}
