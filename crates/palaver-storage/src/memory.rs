//! Embedded in-memory database engine.
//!
//! The baseline engine behind the [`DatabaseProvider`] contract. It keeps
//! whole tables as row vectors and understands the statement shapes the
//! application issues — full-table SELECT, filtered SELECT, single-row
//! INSERT, UPDATE and DELETE with one equality predicate. Anything outside
//! that grammar is an `Unsupported` error rather than a silent no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use palaver_core::Row;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::is_identifier;
use crate::{DatabaseProvider, QueryOutput, QueryRequest, SqlValue, StorageError, StorageResult, WriteResult};

/// In-memory SQL engine holding tables as row vectors.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    connected: AtomicBool,
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryDatabase {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents of one table.
    pub async fn seed(&self, table: impl Into<String>, rows: Vec<Row>) {
        self.tables.write().await.insert(table.into(), rows);
    }

    /// Returns a copy of the current rows of one table.
    pub async fn snapshot(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn resolve<'a>(values: &'a [SqlValue], index: usize) -> StorageResult<&'a SqlValue> {
        values.get(index).ok_or_else(|| {
            StorageError::query(format!("missing bound value for ${}", index + 1))
        })
    }

    fn matches(row: &Row, column: &str, value: &SqlValue) -> bool {
        row.get(column) == Some(&value.to_json())
    }

    fn next_id(rows: &[Row]) -> i64 {
        rows.iter()
            .filter_map(|r| r.get("id").and_then(serde_json::Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[async_trait]
impl DatabaseProvider for MemoryDatabase {
    async fn connect(&self) -> StorageResult<()> {
        self.connected.store(true, Ordering::SeqCst);
        debug!("memory database connected");
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> StorageResult<QueryOutput> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StorageError::NotConnected);
        }

        let statement = parse(&request.query)?;
        match statement {
            Statement::Select { table, filter } => {
                let tables = self.tables.read().await;
                let rows = tables.get(&table).cloned().unwrap_or_default();
                let rows = match filter {
                    None => rows,
                    Some((column, index)) => {
                        let value = Self::resolve(&request.values, index)?;
                        rows.into_iter()
                            .filter(|row| Self::matches(row, &column, value))
                            .collect()
                    }
                };
                Ok(QueryOutput::Rows(rows))
            }
            Statement::Insert {
                table,
                columns,
                params,
            } => {
                let mut tables = self.tables.write().await;
                let rows = tables.entry(table).or_default();

                let mut row = Row::new();
                for (column, index) in columns.iter().zip(params.iter()) {
                    let value = Self::resolve(&request.values, *index)?;
                    row.set(column.clone(), value.to_json());
                }

                let insert_id = match row.get("id") {
                    Some(value) => value.as_i64(),
                    None => {
                        let id = Self::next_id(rows);
                        row.set("id", id.into());
                        Some(id)
                    }
                };
                rows.push(row);
                Ok(QueryOutput::Write(WriteResult {
                    rows_affected: 1,
                    insert_id,
                }))
            }
            Statement::Update {
                table,
                assignments,
                filter: (column, index),
            } => {
                let value = Self::resolve(&request.values, index)?.clone();
                let mut tables = self.tables.write().await;
                let rows = tables.entry(table).or_default();
                let mut affected = 0;
                for row in rows.iter_mut() {
                    if !Self::matches(row, &column, &value) {
                        continue;
                    }
                    for (target, param) in &assignments {
                        let bound = Self::resolve(&request.values, *param)?;
                        row.set(target.clone(), bound.to_json());
                    }
                    affected += 1;
                }
                Ok(QueryOutput::Write(WriteResult {
                    rows_affected: affected,
                    insert_id: None,
                }))
            }
            Statement::Delete {
                table,
                filter: (column, index),
            } => {
                let value = Self::resolve(&request.values, index)?.clone();
                let mut tables = self.tables.write().await;
                let rows = tables.entry(table).or_default();
                let before = rows.len();
                rows.retain(|row| !Self::matches(row, &column, &value));
                Ok(QueryOutput::Write(WriteResult {
                    rows_affected: (before - rows.len()) as u64,
                    insert_id: None,
                }))
            }
        }
    }

    async fn disconnect(&self) -> StorageResult<()> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Err(StorageError::NotConnected);
        }
        debug!("memory database disconnected");
        Ok(())
    }
}

#[derive(Debug)]
enum Statement {
    Select {
        table: String,
        filter: Option<(String, usize)>,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        params: Vec<usize>,
    },
    Update {
        table: String,
        assignments: Vec<(String, usize)>,
        filter: (String, usize),
    },
    Delete {
        table: String,
        filter: (String, usize),
    },
}

fn parse(sql: &str) -> StorageResult<Statement> {
    let tokens = tokenize(sql);
    let mut cursor = Cursor::new(sql, &tokens);

    if cursor.eat_keyword("SELECT") {
        cursor.expect("*")?;
        cursor.expect_keyword("FROM")?;
        let table = cursor.identifier()?;
        let filter = if cursor.eat_keyword("WHERE") {
            Some(cursor.predicate()?)
        } else {
            None
        };
        cursor.finish()?;
        return Ok(Statement::Select { table, filter });
    }

    if cursor.eat_keyword("INSERT") {
        cursor.expect_keyword("INTO")?;
        let table = cursor.identifier()?;
        cursor.expect("(")?;
        let mut columns = Vec::new();
        loop {
            columns.push(cursor.identifier()?);
            if !cursor.eat(",") {
                break;
            }
        }
        cursor.expect(")")?;
        cursor.expect_keyword("VALUES")?;
        cursor.expect("(")?;
        let mut params = Vec::new();
        loop {
            params.push(cursor.placeholder()?);
            if !cursor.eat(",") {
                break;
            }
        }
        cursor.expect(")")?;
        cursor.finish()?;
        if columns.len() != params.len() {
            return Err(StorageError::unsupported(format!(
                "column/value count mismatch in `{sql}`"
            )));
        }
        return Ok(Statement::Insert {
            table,
            columns,
            params,
        });
    }

    if cursor.eat_keyword("UPDATE") {
        let table = cursor.identifier()?;
        cursor.expect_keyword("SET")?;
        let mut assignments = Vec::new();
        loop {
            let column = cursor.identifier()?;
            cursor.expect("=")?;
            let param = cursor.placeholder()?;
            assignments.push((column, param));
            if !cursor.eat(",") {
                break;
            }
        }
        cursor.expect_keyword("WHERE")?;
        let filter = cursor.predicate()?;
        cursor.finish()?;
        return Ok(Statement::Update {
            table,
            assignments,
            filter,
        });
    }

    if cursor.eat_keyword("DELETE") {
        cursor.expect_keyword("FROM")?;
        let table = cursor.identifier()?;
        cursor.expect_keyword("WHERE")?;
        let filter = cursor.predicate()?;
        cursor.finish()?;
        return Ok(Statement::Delete { table, filter });
    }

    Err(StorageError::unsupported(format!(
        "statement not recognized: `{sql}`"
    )))
}

fn tokenize(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in sql.chars() {
        match c {
            '(' | ')' | ',' | '=' | '*' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

struct Cursor<'a> {
    sql: &'a str,
    tokens: &'a [String],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(sql: &'a str, tokens: &'a [String]) -> Self {
        Self {
            sql,
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self
            .peek()
            .is_some_and(|t| t.eq_ignore_ascii_case(keyword))
        {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> StorageResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(token))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> StorageResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn identifier(&mut self) -> StorageResult<String> {
        match self.advance() {
            Some(token) if is_identifier(token) => Ok(token.to_string()),
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parses a `$n` placeholder into its zero-based value index.
    fn placeholder(&mut self) -> StorageResult<usize> {
        match self.advance() {
            Some(token) if token.starts_with('$') => token[1..]
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .map(|n| n - 1)
                .ok_or_else(|| self.unexpected("placeholder")),
            _ => Err(self.unexpected("placeholder")),
        }
    }

    /// Parses `column = $n`.
    fn predicate(&mut self) -> StorageResult<(String, usize)> {
        let column = self.identifier()?;
        self.expect("=")?;
        let param = self.placeholder()?;
        Ok((column, param))
    }

    fn finish(&self) -> StorageResult<()> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(self.unexpected("end of statement"))
        }
    }

    fn unexpected(&self, expected: &str) -> StorageError {
        StorageError::unsupported(format!("expected {expected} in `{}`", self.sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        Row::from_value(value).unwrap()
    }

    async fn engine() -> MemoryDatabase {
        let db = MemoryDatabase::new();
        db.connect().await.unwrap();
        db.seed(
            "members",
            vec![
                row(json!({"id": 1, "name": "ada", "totalPosts": 10})),
                row(json!({"id": 2, "name": "brin", "totalPosts": 4})),
            ],
        )
        .await;
        db
    }

    #[tokio::test]
    async fn test_query_before_connect_fails() {
        let db = MemoryDatabase::new();
        let err = db
            .query(QueryRequest::new("SELECT * FROM members"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotConnected));
    }

    #[tokio::test]
    async fn test_full_table_select() {
        let db = engine().await;
        let rows = db
            .query(QueryRequest::new("SELECT * FROM members"))
            .await
            .unwrap()
            .into_rows()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_filtered_select() {
        let db = engine().await;
        let rows = db
            .query(QueryRequest::new("SELECT * FROM members WHERE id = $1").bind(2i64))
            .await
            .unwrap()
            .into_rows()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name").unwrap(), "brin");
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let db = engine().await;
        let result = db
            .query(
                QueryRequest::new("INSERT INTO members (name, totalPosts) VALUES ($1, $2)")
                    .bind("cleo")
                    .bind(0i64),
            )
            .await
            .unwrap()
            .into_write()
            .unwrap();
        assert_eq!(result.insert_id, Some(3));
        assert_eq!(db.snapshot("members").await.len(), 3);
    }

    #[tokio::test]
    async fn test_insert_with_explicit_string_id() {
        let db = engine().await;
        let result = db
            .query(
                QueryRequest::new(
                    "INSERT INTO member_devices (id, memberId, token) VALUES ($1, $2, $3)",
                )
                .bind("abc123")
                .bind(1i64)
                .bind("tok"),
            )
            .await
            .unwrap()
            .into_write()
            .unwrap();
        assert_eq!(result.insert_id, None);
        assert_eq!(result.rows_affected, 1);
    }

    #[tokio::test]
    async fn test_update_touches_only_matching_rows() {
        let db = engine().await;
        let result = db
            .query(
                QueryRequest::new("UPDATE members SET totalPosts = $1, name = $2 WHERE id = $3")
                    .bind(11i64)
                    .bind("ada l")
                    .bind(1i64),
            )
            .await
            .unwrap()
            .into_write()
            .unwrap();
        assert_eq!(result.rows_affected, 1);

        let rows = db.snapshot("members").await;
        assert_eq!(rows[0].get_i64("totalPosts").unwrap(), 11);
        assert_eq!(rows[1].get_i64("totalPosts").unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = engine().await;
        let result = db
            .query(QueryRequest::new("DELETE FROM members WHERE id = $1").bind(1i64))
            .await
            .unwrap()
            .into_write()
            .unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(db.snapshot("members").await.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_statement() {
        let db = engine().await;
        let err = db
            .query(QueryRequest::new("TRUNCATE members"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_disconnect_without_connection_fails() {
        let db = MemoryDatabase::new();
        assert!(db.disconnect().await.is_err());
        db.connect().await.unwrap();
        assert!(db.disconnect().await.is_ok());
        assert!(db.disconnect().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_bound_value() {
        let db = engine().await;
        let err = db
            .query(QueryRequest::new("SELECT * FROM members WHERE id = $1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Query { .. }));
    }
}
