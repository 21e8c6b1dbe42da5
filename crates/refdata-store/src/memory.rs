//! In-memory [`Session`] implementation for tests and the demo workload.
//!
//! Recognizes the INSERT/SELECT statement shapes the coordinator and reader
//! prepare (a column list plus positional values); it is not a query
//! engine. Rows live in process memory, keyed by their leading key columns,
//! and an insert overwrites the row under its key, which gives
//! `historic_data` the replace-whole-history semantics the data model
//! requires.
//!
//! Fault injection for tests: a per-write completion delay sampled from a
//! configurable range, and a failure rule evaluated against each bound
//! write.

use crate::client::{BoundStatement, PendingWrite, PreparedStatement, Row, Session, Value};
use crate::error::{ConnectError, SessionError};
use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

type FailureRule = dyn Fn(&BoundStatement) -> bool + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StatementShape {
    Insert { table: String, columns: Vec<String> },
    Select { table: String, columns: Vec<String> },
}

#[derive(Default)]
struct TableData {
    rows: HashMap<Vec<String>, Row>,
}

/// In-process storage session.
///
/// Cloning is cheap and every clone shares the same tables, so a clone can
/// be moved into spawned completion tasks.
#[derive(Clone, Default)]
pub struct InMemorySession {
    tables: Arc<RwLock<HashMap<String, TableData>>>,
    write_delay_ms: Option<Range<u64>>,
    failure_rule: Option<Arc<FailureRule>>,
    closed: Arc<AtomicBool>,
}

impl std::fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySession")
            .field("write_delay_ms", &self.write_delay_ms)
            .field("failure_rule", &self.failure_rule.is_some())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl InMemorySession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session against the given contact points.
    ///
    /// The in-memory cluster is always reachable, but an empty contact-point
    /// list is still a bootstrap error, exactly as it is for a real cluster.
    pub fn connect(contact_points: &[&str]) -> Result<Self, ConnectError> {
        if contact_points.is_empty() {
            return Err(ConnectError::NoContactPoints);
        }
        Ok(Self::new())
    }

    /// Delay each asynchronous write by a random duration from `range`
    /// (milliseconds)
    pub fn with_write_delay_ms(mut self, range: Range<u64>) -> Self {
        self.write_delay_ms = Some(range);
        self
    }

    /// Fail writes matching `rule` with a rejected error
    pub fn with_failure_rule(
        mut self,
        rule: impl Fn(&BoundStatement) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.failure_rule = Some(Arc::new(rule));
        self
    }

    fn check_open(&self) -> Result<(), SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    fn check_failure(&self, statement: &BoundStatement) -> Result<(), SessionError> {
        if let Some(rule) = &self.failure_rule {
            if rule(statement) {
                return Err(SessionError::Rejected("injected failure".to_string()));
            }
        }
        Ok(())
    }

    fn sample_delay(&self) -> Option<Duration> {
        self.write_delay_ms
            .clone()
            .filter(|range| !range.is_empty())
            .map(|range| Duration::from_millis(rand::thread_rng().gen_range(range)))
    }

    fn apply_write(&self, statement: &BoundStatement) -> Result<(), SessionError> {
        let StatementShape::Insert { table, columns } =
            parse_statement(statement.statement.text())?
        else {
            return Err(unsupported(statement.statement.text()));
        };

        if columns.len() != statement.values.len() {
            return Err(SessionError::Rejected(format!(
                "expected {} values, got {}",
                columns.len(),
                statement.values.len()
            )));
        }

        let width = key_width(&table);
        if statement.values.len() < width {
            return Err(SessionError::Rejected(format!(
                "{table} requires {width} key values"
            )));
        }
        let key: Vec<String> = statement.values[..width].iter().map(key_token).collect();

        let mut row = Row::new();
        for (column, value) in columns.iter().zip(&statement.values) {
            row.push(column.clone(), value.clone());
        }

        self.tables
            .write()
            .entry(table)
            .or_default()
            .rows
            .insert(key, row);
        Ok(())
    }
}

#[async_trait]
impl Session for InMemorySession {
    async fn prepare(&self, text: &str) -> Result<PreparedStatement, SessionError> {
        self.check_open()?;
        parse_statement(text)?;
        Ok(PreparedStatement::new(text))
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<(), SessionError> {
        self.check_open()?;
        if let Some(delay) = self.sample_delay() {
            tokio::time::sleep(delay).await;
        }
        self.check_failure(statement)?;
        self.apply_write(statement)
    }

    fn execute_async(&self, statement: &BoundStatement) -> PendingWrite {
        if let Err(e) = self.check_open() {
            return PendingWrite::ready(Err(e));
        }

        let (tx, handle) = PendingWrite::channel();
        let session = self.clone();
        let statement = statement.clone();
        let delay = self.sample_delay();

        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let outcome = session
                .check_failure(&statement)
                .and_then(|()| session.apply_write(&statement));
            let _ = tx.send(outcome);
        });

        handle
    }

    async fn query(&self, statement: &BoundStatement) -> Result<Vec<Row>, SessionError> {
        self.check_open()?;
        let StatementShape::Select { table, columns } =
            parse_statement(statement.statement.text())?
        else {
            return Err(unsupported(statement.statement.text()));
        };

        let key: Vec<String> = statement.values.iter().map(key_token).collect();

        let tables = self.tables.read();
        let Some(row) = tables.get(&table).and_then(|data| data.rows.get(&key)) else {
            return Ok(Vec::new());
        };

        if columns.iter().any(|column| column == "*") {
            return Ok(vec![row.clone()]);
        }

        let mut projected = Row::new();
        for column in &columns {
            match row.get(column) {
                Some(value) => projected.push(column.clone(), value.clone()),
                None => {
                    return Err(SessionError::Rejected(format!("unknown column {column}")));
                }
            }
        }
        Ok(vec![projected])
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Leading key columns per table: (exchange, symbol) everywhere except
/// dividends, which also keys on the event date.
fn key_width(table: &str) -> usize {
    match table.rsplit('.').next().unwrap_or(table) {
        "dividends" => 3,
        _ => 2,
    }
}

fn key_token(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Timestamp(ms) => ms.to_string(),
        other => format!("{other:?}"),
    }
}

fn parse_statement(text: &str) -> Result<StatementShape, SessionError> {
    let lowered = text.trim().trim_end_matches(';').to_ascii_lowercase();

    if let Some(rest) = lowered.strip_prefix("insert into ") {
        let open = rest.find('(').ok_or_else(|| unsupported(text))?;
        let table = rest[..open].trim().to_string();
        let close = open + 1 + rest[open + 1..].find(')').ok_or_else(|| unsupported(text))?;
        let columns = split_idents(&rest[open + 1..close]);
        if table.is_empty() || columns.is_empty() || !rest[close + 1..].contains("values") {
            return Err(unsupported(text));
        }
        Ok(StatementShape::Insert { table, columns })
    } else if let Some(rest) = lowered.strip_prefix("select ") {
        let from = rest.find(" from ").ok_or_else(|| unsupported(text))?;
        let columns = split_idents(&rest[..from]);
        let table = rest[from + " from ".len()..]
            .split_whitespace()
            .next()
            .ok_or_else(|| unsupported(text))?
            .to_string();
        if columns.is_empty() {
            return Err(unsupported(text));
        }
        Ok(StatementShape::Select { table, columns })
    } else {
        Err(unsupported(text))
    }
}

fn split_idents(s: &str) -> Vec<String> {
    s.split(',')
        .map(|ident| ident.trim().to_string())
        .filter(|ident| !ident.is_empty())
        .collect()
}

fn unsupported(text: &str) -> SessionError {
    SessionError::UnsupportedStatement(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let shape = parse_statement(
            "INSERT INTO refdata.dividends (exchange, symbol, date, dividend) VALUES (?, ?, ?, ?)",
        )
        .unwrap();
        assert_eq!(
            shape,
            StatementShape::Insert {
                table: "refdata.dividends".to_string(),
                columns: vec![
                    "exchange".to_string(),
                    "symbol".to_string(),
                    "date".to_string(),
                    "dividend".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_parse_select() {
        let shape = parse_statement(
            "SELECT dates, closes FROM refdata.historic_data WHERE exchange = ? AND symbol = ?",
        )
        .unwrap();
        assert_eq!(
            shape,
            StatementShape::Select {
                table: "refdata.historic_data".to_string(),
                columns: vec!["dates".to_string(), "closes".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_statement("DROP TABLE refdata.historic_data").is_err());
        assert!(parse_statement("INSERT INTO t VALUES (?)").is_err());
    }

    #[test]
    fn test_connect_requires_contact_points() {
        assert_eq!(
            InMemorySession::connect(&[]).unwrap_err(),
            ConnectError::NoContactPoints
        );
        assert!(InMemorySession::connect(&["localhost"]).is_ok());
    }

    #[tokio::test]
    async fn test_insert_select_roundtrip() {
        let session = InMemorySession::new();
        let insert = session
            .prepare("INSERT INTO refdata.dividends (exchange, symbol, date, dividend) VALUES (?, ?, ?, ?)")
            .await
            .unwrap();
        let select = session
            .prepare("SELECT dividend FROM refdata.dividends WHERE exchange = ? AND symbol = ? AND date = ?")
            .await
            .unwrap();

        session
            .execute(&insert.bind(vec![
                Value::Text("NYSE".into()),
                Value::Text("ACME".into()),
                Value::Timestamp(86_400_000),
                Value::Double(0.42),
            ]))
            .await
            .unwrap();

        let rows = session
            .query(&select.bind(vec![
                Value::Text("NYSE".into()),
                Value::Text("ACME".into()),
                Value::Timestamp(86_400_000),
            ]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("dividend"), Some(&Value::Double(0.42)));

        // Different date: separate row, not found.
        let rows = session
            .query(&select.bind(vec![
                Value::Text("NYSE".into()),
                Value::Text("ACME".into()),
                Value::Timestamp(0),
            ]))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_insert_overwrites_per_key() {
        let session = InMemorySession::new();
        let insert = session
            .prepare("INSERT INTO refdata.exchange_metadata (exchange, symbol, last_updated_date) VALUES (?, ?, ?)")
            .await
            .unwrap();
        let select = session
            .prepare("SELECT last_updated_date FROM refdata.exchange_metadata WHERE exchange = ? AND symbol = ?")
            .await
            .unwrap();

        let key = vec![Value::Text("NYSE".into()), Value::Text("ACME".into())];
        for date in [1, 2] {
            let mut values = key.clone();
            values.push(Value::Timestamp(date));
            session.execute(&insert.bind(values)).await.unwrap();
        }

        let rows = session.query(&select.bind(key)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("last_updated_date"), Some(&Value::Timestamp(2)));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_operations() {
        let session = InMemorySession::new();
        let insert = session
            .prepare("INSERT INTO refdata.dividends (exchange, symbol, date, dividend) VALUES (?, ?, ?, ?)")
            .await
            .unwrap();

        session.close().await;

        let bound = insert.bind(vec![
            Value::Text("NYSE".into()),
            Value::Text("ACME".into()),
            Value::Timestamp(0),
            Value::Double(0.1),
        ]);
        assert_eq!(
            session.execute(&bound).await,
            Err(SessionError::Closed)
        );
        assert_eq!(session.execute_async(&bound).await, Err(SessionError::Closed));
        assert!(session.prepare("SELECT a FROM t WHERE k = ?").await.is_err());
    }

    #[tokio::test]
    async fn test_failure_rule_rejects_matching_writes() {
        let session = InMemorySession::new().with_failure_rule(|statement| {
            statement
                .values
                .iter()
                .any(|value| value.as_f64() == Some(99.0))
        });
        let insert = session
            .prepare("INSERT INTO refdata.dividends (exchange, symbol, date, dividend) VALUES (?, ?, ?, ?)")
            .await
            .unwrap();

        let poisoned = insert.bind(vec![
            Value::Text("NYSE".into()),
            Value::Text("ACME".into()),
            Value::Timestamp(0),
            Value::Double(99.0),
        ]);
        assert!(matches!(
            session.execute(&poisoned).await,
            Err(SessionError::Rejected(_))
        ));

        let clean = insert.bind(vec![
            Value::Text("NYSE".into()),
            Value::Text("ACME".into()),
            Value::Timestamp(0),
            Value::Double(0.5),
        ]);
        assert!(session.execute(&clean).await.is_ok());
    }
}
