//! Errors.

use std::io;

use crate::messages::PgErrorMsg;

/// Various errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Socket(#[from] SocketError),
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Structured error reported by the server while a query was running.
    /// The connection returns to the ready state and stays usable.
    #[error("server error: {0}")]
    Server(Box<PgErrorMsg>),
    #[error("bad configuration: {0}")]
    BadConfig(String),
    #[error("not connected")]
    NotConnected,
    #[error("another query is already in flight")]
    Busy,
}

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read from socket")]
    Read(#[source] io::Error),
    #[error("failed to write to socket")]
    Write(#[source] io::Error),
    #[error("failed to flush socket")]
    Flush(#[source] io::Error),
    #[error("connection closed by server")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("server rejected the TLS upgrade request")]
    RejectedByServer,
    #[error("TLS handshake failed")]
    HandshakeFailed(#[source] native_tls::Error),
    #[error("failed to read TLS material from {path}")]
    ReadMaterial {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid TLS material in {path}")]
    InvalidMaterial {
        path: String,
        #[source]
        source: native_tls::Error,
    },
    #[error("failed to build TLS connector")]
    Connector(#[source] native_tls::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message length {0} is out of range")]
    BadLength(i32),
    #[error("{tag:?} message is truncated: {needed} bytes declared, {available} available")]
    Truncated {
        tag: char,
        needed: usize,
        available: usize,
    },
    #[error("{tag:?} message contains a string without a NUL terminator")]
    UnterminatedString { tag: char },
    #[error("unexpected message {tag:?} while {phase}")]
    Unexpected { tag: char, phase: &'static str },
    #[error("unknown transaction status {0:?}")]
    UnknownTransactionStatus(char),
    #[error("data row value {index} has no matching column descriptor")]
    ColumnOutOfRange { index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("md5 password authentication is not supported")]
    Md5Unsupported,
    #[error("authentication method with code {code} is not supported")]
    MethodUnsupported { code: i32 },
    #[error("server requires a password, but none was configured")]
    PasswordRequired,
    #[error("authentication failed: {0}")]
    Rejected(Box<PgErrorMsg>),
}

impl Error {
    /// True when the connection cannot keep serving queries after this error.
    /// A structured server error and the operation-validity rejections leave
    /// the connection usable; everything else tears it down.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Server(_) | Error::Busy | Error::NotConnected)
    }
}
