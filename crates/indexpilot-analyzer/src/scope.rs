//! Syntactic statement walk
//!
//! Collects, for one statement, the tables each query level brings into
//! scope (with aliases) and the raw column references that appear in
//! index-friendly positions. Subqueries and set-operation branches open
//! child scopes so that their references resolve against their own FROM
//! clause first. The walk is purely syntactic; resolution against schemas
//! happens afterwards.

use sqlparser::ast as sql;

/// A table brought into scope by FROM/JOIN (or the target of INSERT/UPDATE).
#[derive(Debug, Clone)]
pub(crate) struct ScopeTable {
    pub schema_name: String,
    pub table_name: String,
    pub alias: Option<String>,
}

/// One query level: its tables, the raw column references collected at this
/// level (`[col]`, `[tbl, col]`, `[schema, tbl, col]`), and nested scopes.
#[derive(Debug, Default)]
pub(crate) struct ScopeNode {
    pub tables: Vec<ScopeTable>,
    pub column_refs: Vec<Vec<String>>,
    pub children: Vec<ScopeNode>,
}

impl ScopeNode {
    /// Every table of this scope and all nested scopes.
    pub fn all_tables(&self) -> Vec<&ScopeTable> {
        let mut tables: Vec<&ScopeTable> = self.tables.iter().collect();
        for child in &self.children {
            tables.extend(child.all_tables());
        }
        tables
    }
}

pub(crate) fn walk_statement(default_schema: &str, statement: &sql::Statement) -> ScopeNode {
    let mut walker = Walker {
        default_schema,
        stack: vec![ScopeNode::default()],
    };
    walker.statement(statement);
    walker
        .stack
        .pop()
        .expect("scope stack always holds the root")
}

struct Walker<'a> {
    default_schema: &'a str,
    stack: Vec<ScopeNode>,
}

impl Walker<'_> {
    fn current(&mut self) -> &mut ScopeNode {
        self.stack.last_mut().expect("scope stack is never empty")
    }

    /// Run `f` inside a fresh child scope of the current one.
    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.stack.push(ScopeNode::default());
        f(self);
        let node = self.stack.pop().expect("nested scope was just pushed");
        self.current().children.push(node);
    }

    fn statement(&mut self, statement: &sql::Statement) {
        match statement {
            sql::Statement::Query(query) => self.query(query),
            sql::Statement::Insert(insert) => {
                self.table(&insert.table_name, None);
                if let Some(source) = &insert.source {
                    self.nested(|w| w.query(source));
                }
            }
            sql::Statement::Update {
                table,
                from,
                selection,
                ..
            } => {
                self.table_with_joins(table);
                if let Some(from) = from {
                    self.table_with_joins(from);
                }
                if let Some(selection) = selection {
                    self.predicate(selection);
                }
            }
            _ => {}
        }
    }

    /// Walk a query into the current scope.
    fn query(&mut self, query: &sql::Query) {
        self.set_expr(&query.body);
        if let Some(order_by) = &query.order_by {
            for item in &order_by.exprs {
                self.column_expr(&item.expr);
            }
        }
    }

    fn set_expr(&mut self, body: &sql::SetExpr) {
        match body {
            sql::SetExpr::Select(select) => self.select(select),
            sql::SetExpr::Query(inner) => self.query(inner),
            sql::SetExpr::SetOperation { left, right, .. } => {
                // each branch of a UNION/INTERSECT/EXCEPT has its own FROM
                self.nested(|w| w.set_expr(left));
                self.nested(|w| w.set_expr(right));
            }
            _ => {}
        }
    }

    fn select(&mut self, select: &sql::Select) {
        for table in &select.from {
            self.table_with_joins(table);
        }
        if let Some(selection) = &select.selection {
            self.predicate(selection);
        }
        if let sql::GroupByExpr::Expressions(exprs, _) = &select.group_by {
            for expr in exprs {
                self.column_expr(expr);
            }
        }
        if let Some(having) = &select.having {
            self.predicate(having);
        }
    }

    fn table_with_joins(&mut self, table: &sql::TableWithJoins) {
        self.table_factor(&table.relation);
        for join in &table.joins {
            self.table_factor(&join.relation);
            match join_constraint(&join.join_operator) {
                Some(sql::JoinConstraint::On(expr)) => self.predicate(expr),
                Some(sql::JoinConstraint::Using(columns)) => {
                    for ident in columns {
                        self.current().column_refs.push(vec![ident.value.clone()]);
                    }
                }
                _ => {}
            }
        }
    }

    fn table_factor(&mut self, factor: &sql::TableFactor) {
        match factor {
            sql::TableFactor::Table { name, alias, .. } => {
                self.table(name, alias.as_ref().map(|a| a.name.value.clone()));
            }
            sql::TableFactor::Derived { subquery, .. } => {
                self.nested(|w| w.query(subquery));
            }
            sql::TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins),
            _ => {}
        }
    }

    fn table(&mut self, name: &sql::ObjectName, alias: Option<String>) {
        let parts = &name.0;
        let Some(table_name) = parts.last().map(|i| i.value.to_lowercase()) else {
            return;
        };
        let schema_name = if parts.len() >= 2 {
            parts[parts.len() - 2].value.to_lowercase()
        } else {
            self.default_schema.to_lowercase()
        };
        self.current().tables.push(ScopeTable {
            schema_name,
            table_name,
            alias: alias.map(|a| a.to_lowercase()),
        });
    }

    /// An expression in predicate position (WHERE / ON / HAVING). Only the
    /// shapes an index can serve contribute column references.
    fn predicate(&mut self, expr: &sql::Expr) {
        match expr {
            sql::Expr::BinaryOp { left, op, right } => match op {
                sql::BinaryOperator::And | sql::BinaryOperator::Or => {
                    self.predicate(left);
                    self.predicate(right);
                }
                sql::BinaryOperator::Eq
                | sql::BinaryOperator::NotEq
                | sql::BinaryOperator::Lt
                | sql::BinaryOperator::LtEq
                | sql::BinaryOperator::Gt
                | sql::BinaryOperator::GtEq => {
                    self.column_expr(left);
                    self.column_expr(right);
                }
                _ => {}
            },
            sql::Expr::Between { expr, .. } => self.column_expr(expr),
            sql::Expr::InList { expr, .. } => self.column_expr(expr),
            sql::Expr::InSubquery { expr, subquery, .. } => {
                self.column_expr(expr);
                self.nested(|w| w.query(subquery));
            }
            sql::Expr::Like { expr, .. } | sql::Expr::ILike { expr, .. } => self.column_expr(expr),
            sql::Expr::IsNull(expr) | sql::Expr::IsNotNull(expr) => self.column_expr(expr),
            sql::Expr::Nested(inner) => self.predicate(inner),
            sql::Expr::UnaryOp {
                op: sql::UnaryOperator::Not,
                expr,
            } => self.predicate(expr),
            sql::Expr::Exists { subquery, .. } => self.nested(|w| w.query(subquery)),
            sql::Expr::Subquery(subquery) => self.nested(|w| w.query(subquery)),
            _ => {}
        }
    }

    /// Record a direct column reference; any other expression shape is not
    /// indexable.
    fn column_expr(&mut self, expr: &sql::Expr) {
        match expr {
            sql::Expr::Identifier(ident) => {
                self.current().column_refs.push(vec![ident.value.clone()]);
            }
            sql::Expr::CompoundIdentifier(idents) => {
                let reference = idents.iter().map(|i| i.value.clone()).collect();
                self.current().column_refs.push(reference);
            }
            sql::Expr::Nested(inner) => self.column_expr(inner),
            _ => {}
        }
    }
}

fn join_constraint(operator: &sql::JoinOperator) -> Option<&sql::JoinConstraint> {
    match operator {
        sql::JoinOperator::Inner(constraint)
        | sql::JoinOperator::LeftOuter(constraint)
        | sql::JoinOperator::RightOuter(constraint)
        | sql::JoinOperator::FullOuter(constraint) => Some(constraint),
        _ => None,
    }
}
