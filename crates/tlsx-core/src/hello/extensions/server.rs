//! Extension bodies as a ServerHello or HelloRetryRequest encodes them.

use crate::hello::cursor::Cursor;
use crate::hello::extensions::{self as ext, ids, ExtensionRegistry, Malformed};
use crate::hello::types::{ExtensionData, KeyShare};

/// Identifiers absent here (server_name acks, point formats, extended master
/// secret, early data, record size limit) are recorded without decoding.
pub(super) fn registry() -> ExtensionRegistry {
    ExtensionRegistry::new()
        .with(ids::STATUS_REQUEST, ext::status_request_flag)
        .with(ids::ALPN, alpn)
        .with(ids::SIGNED_CERTIFICATE_TIMESTAMP, signed_certificate_timestamps)
        .with(ids::SESSION_TICKET, session_ticket)
        .with(ids::PRE_SHARED_KEY, pre_shared_key)
        .with(ids::SUPPORTED_VERSIONS, supported_version)
        .with(ids::COOKIE, ext::cookie)
        .with(ids::KEY_SHARE, key_share)
        .with(ids::NEXT_PROTOCOL_NEGOTIATION, ext::next_protocol_negotiation)
        .with(ids::RENEGOTIATION_INFO, ext::renegotiation_info)
}

pub fn session_ticket(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SessionTicket(Vec::new()))
}

/// Exactly one selected protocol.
pub fn alpn(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.is_empty() {
        return Err(Malformed("empty protocol list"));
    }
    let proto = ext::protocol_name(&mut list)?;
    if !list.is_empty() {
        return Err(Malformed("server selected more than one protocol"));
    }
    Ok(ExtensionData::Alpn(proto))
}

pub fn signed_certificate_timestamps(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.is_empty() {
        return Err(Malformed("empty SCT list"));
    }
    let mut scts = Vec::new();
    while !list.is_empty() {
        scts.push(ext::u16_prefixed_non_empty(&mut list, "empty SCT")?);
    }
    Ok(ExtensionData::SignedCertificateTimestamps(scts))
}

pub fn supported_version(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SupportedVersion(cur.read_u16()?))
}

/// ServerHello and HelloRetryRequest share the identifier but not the shape;
/// a 2-byte body can only be the HelloRetryRequest's bare group. Any other
/// length is read as group plus key data, and fails there if it is not.
pub fn key_share(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    if cur.remaining() == 2 {
        return Ok(ExtensionData::KeyShare(KeyShare::Group(cur.read_u16()?)));
    }
    let group = cur.read_u16()?;
    let data = cur.read_u16_length_prefixed()?.rest().to_vec();
    Ok(ExtensionData::KeyShare(KeyShare::Share { group, data }))
}

pub fn pre_shared_key(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::PreSharedKey(cur.read_u16()?))
}
