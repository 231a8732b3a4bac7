//! Passive decoding of TLS ClientHello and ServerHello messages.
//!
//! Input is the payload of one TCP segment, starting at the TLS record
//! header. Nothing here reassembles: a hello split across segments fails to
//! decode instead of being stitched together.

pub mod cursor;
mod decode;
pub mod error;
pub mod extensions;
mod fields;
pub mod frame;
pub mod types;

pub use decode::{decode, Hello, ParseMode};
pub use error::ParseError;
pub use extensions::{ids, ExtensionRegistry};
pub use types::{
    ClientHello, ExtensionData, Extensions, HandshakeType, KeyShare, PskIdentity, ServerHello,
};

/// Try to decode `payload` as a ClientHello.
///
/// Returns `Ok(None)` when the payload holds something else (application
/// data, another handshake message), which is the usual case for captured
/// segments. Malformed or truncated hellos are errors.
pub fn classify_client_hello(
    payload: &[u8],
    mode: ParseMode,
) -> Result<Option<ClientHello>, ParseError> {
    matched(decode(payload, mode))
}

/// Try to decode `payload` as a ServerHello or HelloRetryRequest.
///
/// See [`classify_client_hello`] for the meaning of `Ok(None)`.
pub fn classify_server_hello(
    payload: &[u8],
    mode: ParseMode,
) -> Result<Option<ServerHello>, ParseError> {
    matched(decode(payload, mode))
}

fn matched<H>(result: Result<H, ParseError>) -> Result<Option<H>, ParseError> {
    match result {
        Ok(hello) => Ok(Some(hello)),
        Err(e) if e.is_wrong_type() => Ok(None),
        Err(e) => Err(e),
    }
}
