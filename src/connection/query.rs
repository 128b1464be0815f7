//! Simple-query execution and per-statement result accumulation.

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::{Error, ProtocolError};
use crate::messages::{simple_query, BackendMessage, PgErrorMsg};

use super::{Connection, ConnectionState};

/// The full outcome of one `query()` call: one entry per statement in the
/// submitted SQL, in submission order.
#[derive(Debug)]
pub struct QueryResult {
    pub statements: Vec<StatementResult>,
}

/// One statement's command tag and accumulated rows.
#[derive(Debug)]
pub struct StatementResult {
    /// e.g. `"SELECT 3"` or `"INSERT 0 1"`. Empty for an empty statement.
    pub command_tag: String,
    columns: Arc<[String]>,
    pub rows: Vec<Row>,
}

impl StatementResult {
    /// Column names, in wire order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One row: positional values labeled by the statement's column names.
/// A value is `None` when the server sent SQL NULL, which is distinct from
/// an empty string.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    /// Look a value up by column name. The outer `Option` is "no such
    /// column"; the inner one is SQL NULL.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        let index = self.columns.iter().position(|column| column.as_str() == name)?;
        self.values.get(index).map(|value| value.as_deref())
    }

    /// `(column name, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rows collected for the statement currently being received.
struct Accumulator {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl Accumulator {
    fn new(column_names: Vec<String>) -> Accumulator {
        Accumulator {
            columns: column_names.into(),
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, values: Vec<Option<Vec<u8>>>) -> Result<(), ProtocolError> {
        if values.len() > self.columns.len() {
            return Err(ProtocolError::ColumnOutOfRange {
                index: self.columns.len(),
            });
        }

        let values = values
            .into_iter()
            .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
            .collect();

        self.rows.push(Row {
            columns: Arc::clone(&self.columns),
            values,
        });
        Ok(())
    }

    fn finish(self, command_tag: String) -> StatementResult {
        StatementResult {
            command_tag,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

fn rowless_statement(command_tag: String) -> StatementResult {
    StatementResult {
        command_tag,
        columns: Arc::from(Vec::new()),
        rows: Vec::new(),
    }
}

impl Connection {
    /// Run `sql` through the simple query protocol and collect every
    /// statement's result until ReadyForQuery.
    ///
    /// Valid only while the connection is idle: a second call while one is
    /// in flight fails fast with `Busy` before anything is written, since
    /// interleaved reads would corrupt message framing.
    pub async fn query(&mut self, sql: &str) -> Result<QueryResult, Error> {
        match self.state {
            ConnectionState::Closed => return Err(Error::NotConnected),
            ConnectionState::QueryInFlight => return Err(Error::Busy),
            ConnectionState::Ready => {}
        }
        if self.stream.is_none() {
            return Err(Error::NotConnected);
        }

        self.state = ConnectionState::QueryInFlight;
        let result = self.run_query(sql).await;
        match &result {
            // Transport and framing failures kill the connection. A
            // structured server error does not; it already drained to
            // ReadyForQuery below.
            Err(err) if err.is_fatal() => self.teardown(),
            _ => self.state = ConnectionState::Ready,
        }
        result
    }

    async fn run_query(&mut self, sql: &str) -> Result<QueryResult, Error> {
        debug!("Running query ({} bytes)", sql.len());
        self.send(&simple_query(sql)).await?;

        let mut statements: Vec<StatementResult> = Vec::new();
        let mut current: Option<Accumulator> = None;
        let mut server_error: Option<PgErrorMsg> = None;

        loop {
            match self.read_message().await? {
                BackendMessage::RowDescription { columns } => {
                    if server_error.is_none() {
                        let names = columns.into_iter().map(|column| column.name).collect();
                        current = Some(Accumulator::new(names));
                    }
                }

                BackendMessage::DataRow { values } => {
                    if server_error.is_some() {
                        continue;
                    }
                    let accumulator =
                        current.as_mut().ok_or(ProtocolError::Unexpected {
                            tag: 'D',
                            phase: "query execution",
                        })?;
                    accumulator.push_row(values)?;
                }

                BackendMessage::CommandComplete { tag } => {
                    if server_error.is_some() {
                        continue;
                    }
                    statements.push(match current.take() {
                        Some(accumulator) => accumulator.finish(tag),
                        // Statements like SET produce no RowDescription.
                        None => rowless_statement(tag),
                    });
                }

                BackendMessage::EmptyQueryResponse => {
                    if server_error.is_none() {
                        statements.push(rowless_statement(String::new()));
                    }
                }

                BackendMessage::ErrorResponse(fields) => {
                    warn!("Server error during query ({fields})");
                    // The whole batch is aborted; the server still talks
                    // until ReadyForQuery, so keep draining before failing.
                    statements.clear();
                    current = None;
                    server_error = Some(fields);
                }

                BackendMessage::NoticeResponse(notice) => {
                    warn!("Server notice ({notice})");
                }

                BackendMessage::ParameterStatus { name, value } => {
                    self.server_parameters.set_param(name, value);
                }

                BackendMessage::ReadyForQuery { .. } => {
                    return match server_error {
                        Some(fields) => Err(Error::Server(Box::new(fields))),
                        None => Ok(QueryResult { statements }),
                    };
                }

                BackendMessage::Unknown { .. } => {}

                other => {
                    return Err(ProtocolError::Unexpected {
                        tag: other.tag(),
                        phase: "query execution",
                    }
                    .into());
                }
            }
        }
    }
}
