//! Startup handshake: authentication, parameter capture, ReadyForQuery.

use log::{debug, warn};

use crate::errors::{AuthError, Error, ProtocolError};
use crate::messages::{password_message, startup_message, AuthKind, BackendMessage};

use super::Connection;

/// Drive the handshake from StartupMessage to the first ReadyForQuery.
///
/// AuthenticationOk alone does not complete the handshake; the server still
/// follows it with ParameterStatus, BackendKeyData and ReadyForQuery, and
/// only the latter means queries are accepted.
pub(super) async fn handshake(conn: &mut Connection) -> Result<(), Error> {
    let startup = startup_message(
        &conn.config.user,
        &conn.config.database,
        conn.config.application_name.as_deref(),
    );
    conn.send(&startup).await?;

    loop {
        match conn.read_message().await? {
            BackendMessage::Authentication(AuthKind::Ok) => {
                debug!("Authentication successful");
            }

            BackendMessage::Authentication(AuthKind::CleartextPassword) => {
                let password = conn
                    .config
                    .password
                    .as_deref()
                    .ok_or(AuthError::PasswordRequired)?;
                debug!("Server requested a cleartext password");
                conn.send(&password_message(password)).await?;
            }

            BackendMessage::Authentication(AuthKind::Md5Password { .. }) => {
                return Err(AuthError::Md5Unsupported.into());
            }

            BackendMessage::Authentication(AuthKind::Unsupported(code)) => {
                return Err(AuthError::MethodUnsupported { code }.into());
            }

            BackendMessage::ErrorResponse(fields) => {
                return Err(AuthError::Rejected(Box::new(fields)).into());
            }

            BackendMessage::NoticeResponse(notice) => {
                warn!("Server notice during startup ({notice})");
            }

            BackendMessage::ParameterStatus { name, value } => {
                debug!("Server parameter {name} = {value}");
                conn.server_parameters.set_param(name, value);
            }

            BackendMessage::BackendKeyData {
                process_id,
                secret_key,
            } => {
                conn.key_data = Some((process_id, secret_key));
            }

            BackendMessage::ReadyForQuery { .. } => return Ok(()),

            // Unknown tags are diagnostic-only, never fatal.
            BackendMessage::Unknown { .. } => {}

            other => {
                return Err(ProtocolError::Unexpected {
                    tag: other.tag(),
                    phase: "startup",
                }
                .into());
            }
        }
    }
}
