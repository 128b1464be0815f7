use bytes::{BufMut, BytesMut};

/// PostgreSQL protocol version 3.0.
pub const PROTOCOL_VERSION: i32 = 196608;

/// Magic request code that asks the server for a TLS upgrade.
pub const SSL_REQUEST_CODE: i32 = 80877103;

/// Create an SSLRequest message.
///
/// No tag byte; the length counts from the message's own first byte.
pub fn ssl_request() -> BytesMut {
    let mut bytes = BytesMut::with_capacity(8);
    bytes.put_i32(8);
    bytes.put_i32(SSL_REQUEST_CODE);
    bytes
}

/// Create a StartupMessage with the `user` and `database` parameters,
/// plus `application_name` when one is configured.
///
/// No tag byte; the length counts from the message's own first byte.
pub fn startup_message(user: &str, database: &str, application_name: Option<&str>) -> BytesMut {
    let mut bytes = BytesMut::new();

    bytes.put_i32(PROTOCOL_VERSION);

    bytes.put(&b"user\0"[..]);
    bytes.put_slice(user.as_bytes());
    bytes.put_u8(0);

    bytes.put(&b"database\0"[..]);
    bytes.put_slice(database.as_bytes());
    bytes.put_u8(0);

    if let Some(application_name) = application_name {
        bytes.put(&b"application_name\0"[..]);
        bytes.put_slice(application_name.as_bytes());
        bytes.put_u8(0);
    }

    bytes.put_u8(0); // Parameter list terminator

    let len = bytes.len() as i32 + 4;

    let mut startup = BytesMut::with_capacity(len as usize);
    startup.put_i32(len);
    startup.put(bytes);

    startup
}

/// Create a PasswordMessage.
pub fn password_message(password: &str) -> BytesMut {
    let mut bytes = BytesMut::with_capacity(password.len() + 6);
    bytes.put_u8(b'p');
    bytes.put_i32(4 + password.len() as i32 + 1);
    bytes.put_slice(password.as_bytes());
    bytes.put_u8(0);
    bytes
}

/// Create a simple query message.
pub fn simple_query(query: &str) -> BytesMut {
    let mut bytes = BytesMut::new();
    bytes.put_u8(b'Q');
    bytes.put_i32(4 + query.len() as i32 + 1);
    bytes.put_slice(query.as_bytes());
    bytes.put_u8(0);
    bytes
}

/// Create a Terminate message.
pub fn terminate() -> BytesMut {
    let mut bytes = BytesMut::with_capacity(5);
    bytes.put_u8(b'X');
    bytes.put_i32(4);
    bytes
}
