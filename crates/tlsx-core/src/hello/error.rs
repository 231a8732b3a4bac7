use crate::hello::types::HandshakeType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("short message: need at least {needed} bytes, got {got}")]
    ShortMessage { needed: usize, got: usize },
    #[error("declared length {declared} exceeds the {available} bytes available")]
    InvalidLength { declared: usize, available: usize },
    #[error("malformed {0} field")]
    MalformedField(&'static str),
    #[error("{0} bytes of trailing data after the extensions block")]
    TrailingData(usize),
    #[error("malformed extension 0x{id:04x}: {reason}")]
    MalformedExtension { id: u16, reason: &'static str },
    #[error("not a {expected}: content type 0x{content_type:02x}, handshake type 0x{handshake_type:02x}")]
    WrongMessageType {
        expected: HandshakeType,
        content_type: u8,
        handshake_type: u8,
    },
}

impl ParseError {
    /// True when the payload simply carries some other kind of message.
    ///
    /// This is the common case for most captured segments and should not be
    /// treated as malformed input.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, ParseError::WrongMessageType { .. })
    }
}
