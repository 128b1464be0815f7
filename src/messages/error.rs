use bytes::BytesMut;

use crate::errors::ProtocolError;
use crate::messages::types::BytesMutReader;

/// Parsed field set of an ErrorResponse or NoticeResponse message.
///
/// The payload is a sequence of `(field code, NUL-terminated string)` pairs
/// closed by a zero byte. The commonly consulted fields get their own slots;
/// everything else the server sent is retained in `others` so callers see
/// the full set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PgErrorMsg {
    /// `S` field: ERROR, FATAL, PANIC, WARNING, NOTICE, ...
    pub severity: String,
    /// `C` field: SQLSTATE code, e.g. `28P01`.
    pub code: String,
    /// `M` field: primary human-readable message.
    pub message: String,
    /// `D` field.
    pub detail: Option<String>,
    /// `H` field.
    pub hint: Option<String>,
    /// Remaining fields, in wire order, keyed by their one-byte code.
    pub others: Vec<(char, String)>,
}

impl PgErrorMsg {
    /// Parse the field pairs out of a message payload. `tag` is only used to
    /// label decode failures.
    pub fn parse(body: &mut BytesMut, tag: char) -> Result<PgErrorMsg, ProtocolError> {
        let mut msg = PgErrorMsg::default();

        loop {
            let code = body
                .try_get_u8()
                .ok_or(ProtocolError::Truncated { tag, needed: 1, available: 0 })?;
            if code == 0 {
                break;
            }

            let value = body
                .read_string()
                .ok_or(ProtocolError::UnterminatedString { tag })?;

            match code {
                b'S' => msg.severity = value,
                b'C' => msg.code = value,
                b'M' => msg.message = value,
                b'D' => msg.detail = Some(value),
                b'H' => msg.hint = Some(value),
                _ => msg.others.push((code as char, value)),
            }
        }

        Ok(msg)
    }
}

impl std::fmt::Display for PgErrorMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "severity: {} code: {} message: {}",
            self.severity, self.code, self.message
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " detail: {detail}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " hint: {hint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    fn field(bytes: &mut BytesMut, code: u8, value: &str) {
        bytes.put_u8(code);
        bytes.put_slice(value.as_bytes());
        bytes.put_u8(0);
    }

    #[test]
    fn parses_common_fields() {
        let mut body = BytesMut::new();
        field(&mut body, b'S', "FATAL");
        field(&mut body, b'C', "28P01");
        field(&mut body, b'M', "password authentication failed");
        field(&mut body, b'H', "check pg_hba.conf");
        body.put_u8(0);

        let msg = PgErrorMsg::parse(&mut body, 'E').unwrap();
        assert_eq!(msg.severity, "FATAL");
        assert_eq!(msg.code, "28P01");
        assert_eq!(msg.message, "password authentication failed");
        assert_eq!(msg.hint.as_deref(), Some("check pg_hba.conf"));
        assert_eq!(msg.detail, None);
        assert!(msg.others.is_empty());
    }

    #[test]
    fn retains_unrecognized_fields() {
        let mut body = BytesMut::new();
        field(&mut body, b'S', "ERROR");
        field(&mut body, b'C', "42601");
        field(&mut body, b'M', "syntax error");
        field(&mut body, b'P', "15");
        field(&mut body, b'F', "scan.l");
        body.put_u8(0);

        let msg = PgErrorMsg::parse(&mut body, 'E').unwrap();
        assert_eq!(
            msg.others,
            vec![('P', "15".to_string()), ('F', "scan.l".to_string())]
        );
    }

    #[test]
    fn rejects_missing_terminator() {
        let mut body = BytesMut::new();
        body.put_u8(b'M');
        body.put_slice(b"no nul in sight");

        let err = PgErrorMsg::parse(&mut body, 'E').unwrap_err();
        assert!(matches!(err, ProtocolError::UnterminatedString { tag: 'E' }));
    }

    #[test]
    fn rejects_missing_final_zero() {
        let mut body = BytesMut::new();
        field(&mut body, b'M', "lonely");

        let err = PgErrorMsg::parse(&mut body, 'E').unwrap_err();
        assert!(matches!(err, ProtocolError::Truncated { tag: 'E', .. }));
    }
}
