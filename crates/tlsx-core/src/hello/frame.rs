use crate::hello::error::ParseError;
use crate::hello::types::HandshakeType;

pub const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;
pub const RECORD_HEADER_LEN: usize = 5;
pub const HANDSHAKE_HEADER_LEN: usize = 4;

/// Smallest payload that can hold a record header and a handshake header.
pub const MIN_FRAME_LEN: usize = RECORD_HEADER_LEN + HANDSHAKE_HEADER_LEN;

/// Validate the record and handshake headers of a single TCP payload and
/// return the handshake message: its 4-byte header plus the declared body.
///
/// The record header's own length is not consulted; the message length comes
/// from the handshake header. Anything after the declared body (for example a
/// Certificate record sharing the segment) is ignored. A message that
/// continues in a later segment fails with `InvalidLength`, since nothing
/// here reassembles.
pub fn handshake_message(payload: &[u8], expected: HandshakeType) -> Result<&[u8], ParseError> {
    if payload.len() < MIN_FRAME_LEN {
        return Err(ParseError::ShortMessage {
            needed: MIN_FRAME_LEN,
            got: payload.len(),
        });
    }

    let content_type = payload[0];
    let handshake_type = payload[RECORD_HEADER_LEN];
    if content_type != CONTENT_TYPE_HANDSHAKE || handshake_type != expected as u8 {
        return Err(ParseError::WrongMessageType {
            expected,
            content_type,
            handshake_type,
        });
    }

    let body_len = u32::from_be_bytes([0, payload[6], payload[7], payload[8]]) as usize;
    let end = MIN_FRAME_LEN + body_len;
    if end > payload.len() {
        return Err(ParseError::InvalidLength {
            declared: body_len,
            available: payload.len() - MIN_FRAME_LEN,
        });
    }

    Ok(&payload[RECORD_HEADER_LEN..end])
}
