/// A read ran past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("truncated: wanted {wanted} bytes, {remaining} remaining")]
pub struct Truncated {
    pub wanted: usize,
    pub remaining: usize,
}

/// Bounds-checked big-endian reader over a borrowed byte slice.
///
/// Every read either consumes exactly what it asked for or fails with
/// [`Truncated`] and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn read_fixed(&mut self, n: usize) -> Result<&'a [u8], Truncated> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Truncated { wanted: n, remaining });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), Truncated> {
        self.read_fixed(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        Ok(self.read_fixed(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Truncated> {
        let b = self.read_fixed(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u24(&mut self) -> Result<u32, Truncated> {
        let b = self.read_fixed(3)?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, Truncated> {
        let b = self.read_fixed(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// One length byte, then that many bytes.
    pub fn read_u8_length_prefixed(&mut self) -> Result<Cursor<'a>, Truncated> {
        let start = self.pos;
        let len = self.read_u8()? as usize;
        self.read_fixed(len).map(Cursor::new).map_err(|e| {
            self.pos = start;
            e
        })
    }

    /// Two length bytes, then that many bytes.
    pub fn read_u16_length_prefixed(&mut self) -> Result<Cursor<'a>, Truncated> {
        let start = self.pos;
        let len = self.read_u16()? as usize;
        self.read_fixed(len).map(Cursor::new).map_err(|e| {
            self.pos = start;
            e
        })
    }
}
