use crate::hello::cursor::Cursor;
use crate::hello::error::ParseError;
use crate::hello::extensions::{self, ExtensionRegistry};
use crate::hello::fields;
use crate::hello::frame;
use crate::hello::types::{ClientHello, Extensions, HandshakeType, ServerHello};

/// How much of a hello to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Fixed fields and every extension.
    #[default]
    Full,
    /// Fixed fields only. Extension bytes, if any, are never examined.
    Minimal,
}

/// Per-kind hooks for the shared decode routine.
pub trait Hello: Sized {
    const TYPE: HandshakeType;

    fn registry() -> &'static ExtensionRegistry;

    /// Read the fixed fields following the handshake header.
    fn read_fixed_fields(cur: &mut Cursor<'_>, raw: &[u8]) -> Result<Self, ParseError>;

    fn extensions_mut(&mut self) -> &mut Extensions;
}

impl Hello for ServerHello {
    const TYPE: HandshakeType = HandshakeType::ServerHello;

    fn registry() -> &'static ExtensionRegistry {
        ExtensionRegistry::server()
    }

    fn read_fixed_fields(cur: &mut Cursor<'_>, raw: &[u8]) -> Result<Self, ParseError> {
        fields::server_hello(cur, raw)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

impl Hello for ClientHello {
    const TYPE: HandshakeType = HandshakeType::ClientHello;

    fn registry() -> &'static ExtensionRegistry {
        ExtensionRegistry::client()
    }

    fn read_fixed_fields(cur: &mut Cursor<'_>, raw: &[u8]) -> Result<Self, ParseError> {
        fields::client_hello(cur, raw)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Decode one hello of kind `H` from a single TCP payload.
pub fn decode<H: Hello>(payload: &[u8], mode: ParseMode) -> Result<H, ParseError> {
    let msg = frame::handshake_message(payload, H::TYPE)?;
    let mut cur = Cursor::new(msg);
    let mut hello = H::read_fixed_fields(&mut cur, msg)?;

    // Extensions are optional; a hello may end right after its fixed fields.
    if mode == ParseMode::Minimal || cur.is_empty() {
        return Ok(hello);
    }

    *hello.extensions_mut() = extensions::walk(&mut cur, H::registry())?;
    Ok(hello)
}

impl ServerHello {
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        decode(payload, ParseMode::Full)
    }

    pub fn parse_minimal(payload: &[u8]) -> Result<Self, ParseError> {
        decode(payload, ParseMode::Minimal)
    }
}

impl ClientHello {
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        decode(payload, ParseMode::Full)
    }

    pub fn parse_minimal(payload: &[u8]) -> Result<Self, ParseError> {
        decode(payload, ParseMode::Minimal)
    }
}
