//! Connection state machine.
//!
//! Owns exactly one transport stream and one read buffer, reassembles
//! complete backend messages, and drives the startup handshake and the
//! simple-query cycle. At most one operation is in flight at any time.

// Declare submodules
mod parameters;
mod query;
mod startup;
mod stream;

// Re-export public items
pub use parameters::ServerParameters;
pub use query::{QueryResult, Row, StatementResult};

use bytes::BytesMut;
use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::ConnectionConfig;
use crate::errors::{Error, SocketError};
use crate::messages::{decode, terminate, BackendMessage, MessageBuffer};

use stream::{connect_stream, write_all_flush, StreamInner};

/// Caller-observable connection states. The pre-ready handshake states
/// exist only as positions inside `connect()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Ready,
    QueryInFlight,
    Closed,
}

/// A live connection to one PostgreSQL server.
pub struct Connection {
    config: ConnectionConfig,
    stream: Option<StreamInner>,
    read_buffer: MessageBuffer,
    state: ConnectionState,
    server_parameters: ServerParameters,
    /// BackendKeyData from the handshake (process id, secret key).
    key_data: Option<(i32, i32)>,
}

impl Connection {
    /// Open the transport (with optional TLS upgrade) and run the startup
    /// handshake to the first ReadyForQuery.
    pub async fn connect(config: ConnectionConfig) -> Result<Connection, Error> {
        let stream = connect_stream(&config).await?;

        let mut conn = Connection {
            config,
            stream: Some(stream),
            read_buffer: MessageBuffer::new(),
            state: ConnectionState::Closed,
            server_parameters: ServerParameters::new(),
            key_data: None,
        };

        match startup::handshake(&mut conn).await {
            Ok(()) => {
                conn.state = ConnectionState::Ready;
                info!(
                    "Connected to {} as {}/{}",
                    conn.config.server_addr(),
                    conn.config.user,
                    conn.config.database
                );
                Ok(conn)
            }
            Err(err) => {
                // A failed handshake leaves no usable transport behind.
                conn.teardown();
                Err(err)
            }
        }
    }

    /// Send Terminate and close the transport. Idempotent; later operations
    /// fail with `NotConnected`.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if let Some(mut stream) = self.stream.take() {
            self.state = ConnectionState::Closed;
            if let Err(err) = write_all_flush(&mut stream, &terminate()).await {
                debug!("Terminate on disconnect was not delivered: {err}");
            }
            let _ = stream.shutdown().await;
            info!("Disconnected from {}", self.config.server_addr());
        }
        Ok(())
    }

    /// Parameters the server announced via ParameterStatus.
    pub fn server_parameters(&self) -> &ServerParameters {
        &self.server_parameters
    }

    /// Backend process id from BackendKeyData, when the server sent one.
    pub fn backend_pid(&self) -> Option<i32> {
        self.key_data.map(|(process_id, _)| process_id)
    }

    /// Drop the transport after a fatal error; nothing is sent.
    fn teardown(&mut self) {
        self.state = ConnectionState::Closed;
        self.stream = None;
    }

    pub(crate) async fn send(&mut self, bytes: &BytesMut) -> Result<(), Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        write_all_flush(stream, bytes).await
    }

    /// Read the next complete backend message, pulling from the stream as
    /// needed. A single read may complete zero, one, or many messages; the
    /// extraction loop makes no assumption either way.
    pub(crate) async fn read_message(&mut self) -> Result<BackendMessage, Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        loop {
            if let Some((tag, body)) = self.read_buffer.try_next()? {
                let message = decode(tag, body)?;
                if let BackendMessage::Unknown { tag, body } = &message {
                    debug!(
                        "Ignoring unknown message {:?} ({} payload bytes)",
                        *tag as char,
                        body.len()
                    );
                }
                return Ok(message);
            }

            let n = stream
                .read_buf(self.read_buffer.as_mut())
                .await
                .map_err(SocketError::Read)?;
            if n == 0 {
                return Err(SocketError::Closed.into());
            }
        }
    }
}

impl Drop for Connection {
    /// Best-effort Terminate. The socket is in non-blocking mode and may not
    /// be ready for a write; an explicit `disconnect()` is the clean path.
    fn drop(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            match stream.try_write_raw(&terminate()) {
                Ok(5) => (),
                Ok(_) => debug!("Dirty connection shutdown"),
                Err(err) => debug!("Dirty connection shutdown: {err}"),
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("addr", &self.config.server_addr())
            .field("user", &self.config.user)
            .field("database", &self.config.database)
            .field("state", &self.state)
            .finish()
    }
}
