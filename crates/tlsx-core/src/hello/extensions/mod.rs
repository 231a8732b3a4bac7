//! Extension block walker and the identifier → decoder registry.

pub mod client;
pub mod server;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::hello::cursor::{Cursor, Truncated};
use crate::hello::error::ParseError;
use crate::hello::types::{ExtensionData, Extensions};

/// IANA extension identifiers.
pub mod ids {
    pub const SERVER_NAME: u16 = 0;
    pub const STATUS_REQUEST: u16 = 5;
    pub const SUPPORTED_GROUPS: u16 = 10;
    pub const EC_POINT_FORMATS: u16 = 11;
    pub const SIGNATURE_ALGORITHMS: u16 = 13;
    pub const ALPN: u16 = 16;
    pub const SIGNED_CERTIFICATE_TIMESTAMP: u16 = 18;
    pub const PADDING: u16 = 21;
    pub const EXTENDED_MASTER_SECRET: u16 = 23;
    pub const RECORD_SIZE_LIMIT: u16 = 28;
    pub const SESSION_TICKET: u16 = 35;
    pub const PRE_SHARED_KEY: u16 = 41;
    pub const EARLY_DATA: u16 = 42;
    pub const SUPPORTED_VERSIONS: u16 = 43;
    pub const COOKIE: u16 = 44;
    pub const PSK_KEY_EXCHANGE_MODES: u16 = 45;
    pub const POST_HANDSHAKE_AUTH: u16 = 49;
    pub const SIGNATURE_ALGORITHMS_CERT: u16 = 50;
    pub const KEY_SHARE: u16 = 51;
    /// Not IANA assigned.
    pub const NEXT_PROTOCOL_NEGOTIATION: u16 = 13172;
    pub const RENEGOTIATION_INFO: u16 = 0xff01;
}

/// Why a single extension body failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed(pub &'static str);

impl From<Truncated> for Malformed {
    fn from(_: Truncated) -> Self {
        Malformed("truncated")
    }
}

/// Decodes one extension body. The walker rejects any bytes left unread.
pub type DecodeFn = fn(&mut Cursor<'_>) -> Result<ExtensionData, Malformed>;

/// Maps extension identifiers to their decoders.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    decoders: HashMap<u16, DecodeFn>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder, returning the one it replaced.
    pub fn register(&mut self, id: u16, decode: DecodeFn) -> Option<DecodeFn> {
        self.decoders.insert(id, decode)
    }

    pub fn with(mut self, id: u16, decode: DecodeFn) -> Self {
        self.register(id, decode);
        self
    }

    pub fn decoder(&self, id: u16) -> Option<DecodeFn> {
        self.decoders.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decoders for extensions a ServerHello or HelloRetryRequest may carry.
    pub fn server() -> &'static Self {
        static REGISTRY: OnceLock<ExtensionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(server::registry)
    }

    /// Decoders for extensions a ClientHello may carry.
    pub fn client() -> &'static Self {
        static REGISTRY: OnceLock<ExtensionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(client::registry)
    }
}

/// Walk the extensions block that must make up the rest of `cur`.
pub fn walk(cur: &mut Cursor<'_>, registry: &ExtensionRegistry) -> Result<Extensions, ParseError> {
    let declared = cur
        .read_u16()
        .map_err(|_| ParseError::MalformedField("extensions length"))? as usize;
    let block = cur.read_fixed(declared).map_err(|e| ParseError::InvalidLength {
        declared,
        available: e.remaining,
    })?;
    if !cur.is_empty() {
        return Err(ParseError::TrailingData(cur.remaining()));
    }

    let mut block = Cursor::new(block);
    let mut extensions = Extensions::new();
    while !block.is_empty() {
        let id = block
            .read_u16()
            .map_err(|_| ParseError::MalformedField("extension header"))?;
        let mut body = block
            .read_u16_length_prefixed()
            .map_err(|_| ParseError::MalformedExtension {
                id,
                reason: "length exceeds extensions block",
            })?;

        let Some(decode) = registry.decoder(id) else {
            extensions.insert(id, ExtensionData::Unrecognized);
            continue;
        };

        let data = decode(&mut body)
            .map_err(|Malformed(reason)| ParseError::MalformedExtension { id, reason })?;
        if !body.is_empty() {
            return Err(ParseError::MalformedExtension {
                id,
                reason: "trailing bytes in extension body",
            });
        }
        extensions.insert(id, data);
    }

    Ok(extensions)
}

// Decoders shared by both directions.

pub(crate) fn u8_prefixed_opaque(cur: &mut Cursor<'_>) -> Result<Vec<u8>, Malformed> {
    Ok(cur.read_u8_length_prefixed()?.rest().to_vec())
}

pub(crate) fn u16_prefixed_non_empty(cur: &mut Cursor<'_>, what: &'static str) -> Result<Vec<u8>, Malformed> {
    let data = cur.read_u16_length_prefixed()?;
    if data.is_empty() {
        return Err(Malformed(what));
    }
    Ok(data.rest().to_vec())
}

pub(crate) fn protocol_name(cur: &mut Cursor<'_>) -> Result<String, Malformed> {
    let name = cur.read_u8_length_prefixed()?;
    if name.is_empty() {
        return Err(Malformed("empty protocol name"));
    }
    Ok(String::from_utf8_lossy(name.rest()).into_owned())
}

pub(crate) fn u16_list(cur: &mut Cursor<'_>) -> Result<Vec<u16>, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.remaining() % 2 != 0 {
        return Err(Malformed("odd length for a list of 16-bit values"));
    }
    let mut out = Vec::with_capacity(list.remaining() / 2);
    while !list.is_empty() {
        out.push(list.read_u16()?);
    }
    Ok(out)
}

pub fn renegotiation_info(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::RenegotiationInfo(u8_prefixed_opaque(cur)?))
}

pub fn next_protocol_negotiation(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut protos = Vec::new();
    while !cur.is_empty() {
        protos.push(protocol_name(cur)?);
    }
    Ok(ExtensionData::NextProtocolNegotiation(protos))
}

pub fn cookie(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::Cookie(u16_prefixed_non_empty(cur, "empty cookie")?))
}

pub fn status_request_flag(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::StatusRequest)
}

pub fn extended_master_secret(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::ExtendedMasterSecret)
}

pub fn early_data(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::EarlyData)
}

pub fn record_size_limit(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::RecordSizeLimit(cur.read_u16()?))
}

pub fn ec_point_formats(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let formats = cur.read_u8_length_prefixed()?;
    if formats.is_empty() {
        return Err(Malformed("empty point format list"));
    }
    Ok(ExtensionData::EcPointFormats(formats.rest().to_vec()))
}
