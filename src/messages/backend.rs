//! Backend (server -> client) message decoding.
//!
//! `decode` operates on exactly one complete message: the tag byte plus the
//! payload that the framing layer already confirmed to be fully buffered.
//! It never reads from a stream and never sees a partial message.

use bytes::BytesMut;

use crate::errors::ProtocolError;
use crate::messages::error::PgErrorMsg;
use crate::messages::types::BytesMutReader;

// AuthenticationRequest sub-codes.
const AUTH_OK: i32 = 0;
const AUTH_CLEARTEXT_PASSWORD: i32 = 3;
const AUTH_MD5_PASSWORD: i32 = 5;

/// Authentication exchange requested by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthKind {
    Ok,
    CleartextPassword,
    /// Recognized but deliberately unsupported; the connection fails rather
    /// than silently hanging the handshake.
    Md5Password { salt: [u8; 4] },
    Unsupported(i32),
}

/// One column of a RowDescription message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub table_oid: i32,
    pub column_attr: i16,
    pub type_oid: i32,
    pub type_size: i16,
    pub type_modifier: i32,
    pub format_code: i16,
}

/// Transaction status byte carried by ReadyForQuery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Idle,
    InTransaction,
    FailedTransaction,
}

impl TxStatus {
    fn from_u8(status: u8) -> Result<TxStatus, ProtocolError> {
        match status {
            b'I' => Ok(TxStatus::Idle),
            b'T' => Ok(TxStatus::InTransaction),
            b'E' => Ok(TxStatus::FailedTransaction),
            other => Err(ProtocolError::UnknownTransactionStatus(other as char)),
        }
    }
}

/// A decoded backend message.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    Authentication(AuthKind),
    ErrorResponse(PgErrorMsg),
    NoticeResponse(PgErrorMsg),
    ReadyForQuery { tx_status: TxStatus },
    ParameterStatus { name: String, value: String },
    RowDescription { columns: Vec<ColumnDescriptor> },
    DataRow { values: Vec<Option<Vec<u8>>> },
    CommandComplete { tag: String },
    EmptyQueryResponse,
    BackendKeyData { process_id: i32, secret_key: i32 },
    /// Anything we do not recognize; carried for diagnostics, never an error.
    Unknown { tag: u8, body: Vec<u8> },
}

impl BackendMessage {
    /// The wire tag this message was decoded from.
    pub fn tag(&self) -> char {
        match self {
            BackendMessage::Authentication(_) => 'R',
            BackendMessage::ErrorResponse(_) => 'E',
            BackendMessage::NoticeResponse(_) => 'N',
            BackendMessage::ReadyForQuery { .. } => 'Z',
            BackendMessage::ParameterStatus { .. } => 'S',
            BackendMessage::RowDescription { .. } => 'T',
            BackendMessage::DataRow { .. } => 'D',
            BackendMessage::CommandComplete { .. } => 'C',
            BackendMessage::EmptyQueryResponse => 'I',
            BackendMessage::BackendKeyData { .. } => 'K',
            BackendMessage::Unknown { tag, .. } => *tag as char,
        }
    }
}

/// Decode one complete message from its tag and payload.
pub fn decode(tag: u8, mut body: BytesMut) -> Result<BackendMessage, ProtocolError> {
    let t = tag as char;
    match tag {
        b'R' => {
            let code = body.try_get_i32().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 4,
                available: body.len(),
            })?;
            let kind = match code {
                AUTH_OK => AuthKind::Ok,
                AUTH_CLEARTEXT_PASSWORD => AuthKind::CleartextPassword,
                AUTH_MD5_PASSWORD => {
                    if body.len() < 4 {
                        return Err(ProtocolError::Truncated {
                            tag: t,
                            needed: 4,
                            available: body.len(),
                        });
                    }
                    let mut salt = [0u8; 4];
                    salt.copy_from_slice(&body[..4]);
                    AuthKind::Md5Password { salt }
                }
                other => AuthKind::Unsupported(other),
            };
            Ok(BackendMessage::Authentication(kind))
        }

        b'E' => Ok(BackendMessage::ErrorResponse(PgErrorMsg::parse(&mut body, t)?)),

        b'N' => Ok(BackendMessage::NoticeResponse(PgErrorMsg::parse(&mut body, t)?)),

        b'Z' => {
            let status = body.try_get_u8().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 1,
                available: 0,
            })?;
            Ok(BackendMessage::ReadyForQuery {
                tx_status: TxStatus::from_u8(status)?,
            })
        }

        b'S' => {
            let name = body
                .read_string()
                .ok_or(ProtocolError::UnterminatedString { tag: t })?;
            let value = body
                .read_string()
                .ok_or(ProtocolError::UnterminatedString { tag: t })?;
            Ok(BackendMessage::ParameterStatus { name, value })
        }

        b'T' => {
            let count = body.try_get_i16().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 2,
                available: body.len(),
            })?;
            let mut columns = Vec::with_capacity(count.max(0) as usize);
            for _ in 0..count {
                let name = body
                    .read_string()
                    .ok_or(ProtocolError::UnterminatedString { tag: t })?;
                let fixed = |available| ProtocolError::Truncated {
                    tag: t,
                    needed: 18,
                    available,
                };
                let table_oid = body.try_get_i32().ok_or_else(|| fixed(body.len()))?;
                let column_attr = body.try_get_i16().ok_or_else(|| fixed(body.len()))?;
                let type_oid = body.try_get_i32().ok_or_else(|| fixed(body.len()))?;
                let type_size = body.try_get_i16().ok_or_else(|| fixed(body.len()))?;
                let type_modifier = body.try_get_i32().ok_or_else(|| fixed(body.len()))?;
                let format_code = body.try_get_i16().ok_or_else(|| fixed(body.len()))?;
                columns.push(ColumnDescriptor {
                    name,
                    table_oid,
                    column_attr,
                    type_oid,
                    type_size,
                    type_modifier,
                    format_code,
                });
            }
            Ok(BackendMessage::RowDescription { columns })
        }

        b'D' => {
            let count = body.try_get_i16().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 2,
                available: body.len(),
            })?;
            let mut values = Vec::with_capacity(count.max(0) as usize);
            for _ in 0..count {
                let len = body.try_get_i32().ok_or(ProtocolError::Truncated {
                    tag: t,
                    needed: 4,
                    available: body.len(),
                })?;
                if len == -1 {
                    values.push(None);
                    continue;
                }
                if len < 0 {
                    return Err(ProtocolError::BadLength(len));
                }
                let len = len as usize;
                if body.len() < len {
                    return Err(ProtocolError::Truncated {
                        tag: t,
                        needed: len,
                        available: body.len(),
                    });
                }
                values.push(Some(body.split_to(len).to_vec()));
            }
            Ok(BackendMessage::DataRow { values })
        }

        b'C' => {
            let command_tag = body
                .read_string()
                .ok_or(ProtocolError::UnterminatedString { tag: t })?;
            Ok(BackendMessage::CommandComplete { tag: command_tag })
        }

        b'I' => Ok(BackendMessage::EmptyQueryResponse),

        b'K' => {
            let process_id = body.try_get_i32().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 8,
                available: body.len(),
            })?;
            let secret_key = body.try_get_i32().ok_or(ProtocolError::Truncated {
                tag: t,
                needed: 8,
                available: body.len(),
            })?;
            Ok(BackendMessage::BackendKeyData {
                process_id,
                secret_key,
            })
        }

        _ => Ok(BackendMessage::Unknown {
            tag,
            body: body.to_vec(),
        }),
    }
}
