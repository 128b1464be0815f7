//! Async PostgreSQL wire-protocol (v3.0) client.
//!
//! Speaks the simple query protocol over a plain or TLS-upgraded TCP
//! stream: SSLRequest negotiation, startup/authentication handshake, and
//! query execution with per-statement result accumulation.
//!
//! ```no_run
//! use pg_courier::{Connection, ConnectionConfig};
//!
//! # async fn run() -> Result<(), pg_courier::Error> {
//! let config = ConnectionConfig {
//!     host: "localhost".into(),
//!     port: 5432,
//!     user: "app".into(),
//!     database: "appdb".into(),
//!     password: Some("secret".into()),
//!     application_name: None,
//!     tls: None,
//! };
//!
//! let mut conn = Connection::connect(config).await?;
//! let result = conn.query("SELECT 1; SELECT 2").await?;
//! assert_eq!(result.statements.len(), 2);
//! conn.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod errors;
pub mod messages;
pub mod tls;

pub use config::{ConnectionConfig, TlsConfig};
pub use connection::{Connection, QueryResult, Row, ServerParameters, StatementResult};
pub use errors::Error;
pub use messages::PgErrorMsg;
