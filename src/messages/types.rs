use bytes::{Buf, BytesMut};

/// Checked reads over a message payload.
///
/// The `bytes::Buf` getters panic when the buffer runs short; decoders use
/// these instead so a truncated message surfaces as a decode error.
pub trait BytesMutReader {
    /// Read a NUL-terminated protocol string, consuming the terminator.
    /// Returns `None` when no terminator is present.
    fn read_string(&mut self) -> Option<String>;
    fn try_get_u8(&mut self) -> Option<u8>;
    fn try_get_i16(&mut self) -> Option<i16>;
    fn try_get_i32(&mut self) -> Option<i32>;
}

impl BytesMutReader for BytesMut {
    fn read_string(&mut self) -> Option<String> {
        let nul = self.iter().position(|&b| b == 0)?;
        let value = String::from_utf8_lossy(&self[..nul]).into_owned();
        self.advance(nul + 1);
        Some(value)
    }

    fn try_get_u8(&mut self) -> Option<u8> {
        (self.remaining() >= 1).then(|| self.get_u8())
    }

    fn try_get_i16(&mut self) -> Option<i16> {
        (self.remaining() >= 2).then(|| self.get_i16())
    }

    fn try_get_i32(&mut self) -> Option<i32> {
        (self.remaining() >= 4).then(|| self.get_i32())
    }
}
