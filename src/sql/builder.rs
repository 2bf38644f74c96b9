//! Positional statements ready to execute.

use super::params::SqlValue;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// SQL with `$n` placeholders and the values bound to them, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; returns its 1-based placeholder number.
    pub fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// sqlx query with every parameter bound.
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |q, value| q.bind(value.clone()))
    }
}

/// Whitespace collapsed to single spaces, for log lines.
pub fn minify(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
