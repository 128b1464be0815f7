//! Message framing and reassembly.
//!
//! A single stream read may carry zero, one, or many backend messages, and
//! one message may span multiple reads. `MessageBuffer` accumulates raw
//! bytes and only ever hands out complete frames, so the decoder never sees
//! a partial buffer.

use bytes::{Buf, BytesMut};

use crate::errors::ProtocolError;
use crate::messages::MAX_MESSAGE_SIZE;

const HEADER_LEN: usize = 5; // tag (1) + length (4)

/// Growable read buffer with a complete-frame extraction step.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    buf: BytesMut,
}

impl MessageBuffer {
    pub fn new() -> MessageBuffer {
        MessageBuffer {
            buf: BytesMut::with_capacity(8192),
        }
    }

    /// Append raw stream bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// The underlying buffer, for `AsyncReadExt::read_buf` to append into.
    pub(crate) fn as_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Try to extract one complete message.
    ///
    /// Returns `Ok(None)` while the buffered bytes do not yet form a whole
    /// message (header incomplete, or payload still in flight). Returns the
    /// tag and the payload (tag and length header stripped) once a frame is
    /// fully buffered. Declared lengths below 4 or above the size cap are a
    /// protocol error; nothing is consumed in that case.
    pub fn try_next(&mut self) -> Result<Option<(u8, BytesMut)>, ProtocolError> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }

        let tag = self.buf[0];
        let len = i32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]);
        if len < 4 || len > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::BadLength(len));
        }

        let total = 1 + len as usize;
        if self.buf.len() < total {
            return Ok(None);
        }

        let mut frame = self.buf.split_to(total);
        frame.advance(HEADER_LEN);
        Ok(Some((tag, frame)))
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
