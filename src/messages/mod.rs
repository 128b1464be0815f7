// Encoding of frontend messages and decoding/framing of backend messages.

// Declare submodules
pub mod backend;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod types;

// Re-export public items
pub use backend::{decode, AuthKind, BackendMessage, ColumnDescriptor, TxStatus};
pub use error::PgErrorMsg;
pub use framing::MessageBuffer;
pub use protocol::{
    password_message, simple_query, ssl_request, startup_message, terminate, PROTOCOL_VERSION,
    SSL_REQUEST_CODE,
};
pub use types::BytesMutReader;

/// Upper bound on a single backend message. Anything larger is treated as a
/// framing desync rather than buffered.
pub const MAX_MESSAGE_SIZE: i32 = 256 * 1024 * 1024;

#[cfg(test)]
mod framing_tests;
