//! indexpilot Parser - SQL parsing helpers
//!
//! Thin wrapper around sqlparser-rs configured for the MySQL dialect, which
//! is the syntax TiDB accepts. The workload loader additionally needs to
//! split raw scripts while preserving the original statement text (the
//! advisor sends that text back to the database verbatim), so a quote-aware
//! splitter lives here too.

use indexpilot_common::{Error, Result};
use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// Parse a SQL string into a list of statements
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>> {
    Parser::parse_sql(&MySqlDialect {}, sql).map_err(|e| Error::Parse(e.to_string()))
}

/// Parse a single SQL statement
pub fn parse_statement(sql: &str) -> Result<Statement> {
    let statements = parse_sql(sql)?;
    if statements.len() != 1 {
        return Err(Error::Parse(format!(
            "Expected 1 statement, got {}",
            statements.len()
        )));
    }
    Ok(statements.into_iter().next().unwrap())
}

/// Split a raw SQL script into statement texts on `;`, honoring single
/// quotes, double quotes, backticks and `--` line comments. Comments are
/// stripped; statement text is otherwise preserved as written.
pub fn split_raw_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                    current.push(' ');
                }
                ';' => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        let result = parse_sql("SELECT * FROM t WHERE a = 1");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_multiple_statements() {
        let result = parse_sql("SELECT 1; SELECT 2");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_sql("SELECT * FORM t").is_err());
        assert!(parse_statement("SELECT 1; SELECT 2").is_err());
    }

    #[test]
    fn test_parse_mysql_key_syntax() {
        // TiDB-style inline KEY definitions must parse
        let result = parse_statement("create table t (a int, b int, key(a))");
        assert!(result.is_ok());
    }

    #[test]
    fn test_split_raw_statements() {
        let script = "select 1;\nselect 2;\n";
        assert_eq!(split_raw_statements(script), vec!["select 1", "select 2"]);
    }

    #[test]
    fn test_split_keeps_quoted_semicolons() {
        let script = "select * from t where note = 'a;b'; select 2";
        assert_eq!(
            split_raw_statements(script),
            vec!["select * from t where note = 'a;b'", "select 2"]
        );
    }

    #[test]
    fn test_split_strips_line_comments() {
        let script = "-- header\nselect 1; -- trailing; still a comment\nselect 2";
        assert_eq!(split_raw_statements(script), vec!["select 1", "select 2"]);
    }
}
