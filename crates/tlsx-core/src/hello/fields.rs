//! Fixed fields that precede the extensions block.

use crate::hello::cursor::Cursor;
use crate::hello::error::ParseError;
use crate::hello::frame::HANDSHAKE_HEADER_LEN;
use crate::hello::types::{ClientHello, Extensions, ServerHello};

const RANDOM_LEN: usize = 32;

struct Common {
    version: u16,
    random: [u8; 32],
    session_id: Vec<u8>,
}

fn malformed<T>(field: &'static str) -> impl FnOnce(T) -> ParseError {
    move |_| ParseError::MalformedField(field)
}

fn read_common(cur: &mut Cursor<'_>) -> Result<Common, ParseError> {
    cur.skip(HANDSHAKE_HEADER_LEN)
        .map_err(malformed("handshake header"))?;
    let version = cur.read_u16().map_err(malformed("version"))?;
    let mut random = [0u8; RANDOM_LEN];
    random.copy_from_slice(cur.read_fixed(RANDOM_LEN).map_err(malformed("random"))?);
    let session_id = cur
        .read_u8_length_prefixed()
        .map_err(malformed("session id"))?
        .rest()
        .to_vec();

    Ok(Common {
        version,
        random,
        session_id,
    })
}

/// Read a ServerHello up to (not including) its extensions block.
pub fn server_hello(cur: &mut Cursor<'_>, raw: &[u8]) -> Result<ServerHello, ParseError> {
    let common = read_common(cur)?;
    let cipher_suite = cur.read_u16().map_err(malformed("cipher suite"))?;
    let compression_method = cur.read_u8().map_err(malformed("compression method"))?;

    Ok(ServerHello {
        raw: raw.to_vec(),
        version: common.version,
        random: common.random,
        session_id: common.session_id,
        cipher_suite,
        compression_method,
        extensions: Extensions::new(),
    })
}

/// Read a ClientHello up to (not including) its extensions block.
pub fn client_hello(cur: &mut Cursor<'_>, raw: &[u8]) -> Result<ClientHello, ParseError> {
    let common = read_common(cur)?;

    let mut suites = cur
        .read_u16_length_prefixed()
        .map_err(malformed("cipher suites"))?;
    if suites.remaining() % 2 != 0 {
        return Err(ParseError::MalformedField("cipher suites"));
    }
    let mut cipher_suites = Vec::with_capacity(suites.remaining() / 2);
    while !suites.is_empty() {
        cipher_suites.push(suites.read_u16().map_err(malformed("cipher suites"))?);
    }

    let compression_methods = cur
        .read_u8_length_prefixed()
        .map_err(malformed("compression methods"))?
        .rest()
        .to_vec();

    Ok(ClientHello {
        raw: raw.to_vec(),
        version: common.version,
        random: common.random,
        session_id: common.session_id,
        cipher_suites,
        compression_methods,
        extensions: Extensions::new(),
    })
}
