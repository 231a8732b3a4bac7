//! Extension bodies as a ClientHello encodes them.

use crate::hello::cursor::Cursor;
use crate::hello::extensions::{self as ext, ids, ExtensionRegistry, Malformed};
use crate::hello::types::{ExtensionData, KeyShare, PskIdentity};

const SNI_HOST_NAME: u8 = 0;
const STATUS_TYPE_OCSP: u8 = 1;

pub(super) fn registry() -> ExtensionRegistry {
    ExtensionRegistry::new()
        .with(ids::SERVER_NAME, server_name)
        .with(ids::STATUS_REQUEST, status_request)
        .with(ids::SUPPORTED_GROUPS, supported_groups)
        .with(ids::EC_POINT_FORMATS, ext::ec_point_formats)
        .with(ids::SIGNATURE_ALGORITHMS, signature_algorithms)
        .with(ids::ALPN, alpn)
        .with(ids::SIGNED_CERTIFICATE_TIMESTAMP, sct_request)
        .with(ids::EXTENDED_MASTER_SECRET, ext::extended_master_secret)
        .with(ids::RECORD_SIZE_LIMIT, ext::record_size_limit)
        .with(ids::SESSION_TICKET, session_ticket)
        .with(ids::PRE_SHARED_KEY, pre_shared_key)
        .with(ids::EARLY_DATA, ext::early_data)
        .with(ids::SUPPORTED_VERSIONS, supported_versions)
        .with(ids::COOKIE, ext::cookie)
        .with(ids::PSK_KEY_EXCHANGE_MODES, psk_key_exchange_modes)
        .with(ids::POST_HANDSHAKE_AUTH, post_handshake_auth)
        .with(ids::SIGNATURE_ALGORITHMS_CERT, signature_algorithms_cert)
        .with(ids::KEY_SHARE, key_shares)
        .with(ids::NEXT_PROTOCOL_NEGOTIATION, ext::next_protocol_negotiation)
        .with(ids::RENEGOTIATION_INFO, ext::renegotiation_info)
}

/// First host_name entry of the server name list.
pub fn server_name(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.is_empty() {
        return Err(Malformed("empty server name list"));
    }
    let mut host = None;
    while !list.is_empty() {
        let name_type = list.read_u8()?;
        let name = list.read_u16_length_prefixed()?;
        if name_type == SNI_HOST_NAME && host.is_none() {
            if name.is_empty() {
                return Err(Malformed("empty host name"));
            }
            host = Some(String::from_utf8_lossy(name.rest()).into_owned());
        }
    }
    Ok(ExtensionData::ServerName(host))
}

pub fn status_request(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    if cur.read_u8()? == STATUS_TYPE_OCSP {
        cur.read_u16_length_prefixed()?; // responder ids
        cur.read_u16_length_prefixed()?; // request extensions
    } else {
        let rest = cur.remaining();
        cur.skip(rest)?;
    }
    Ok(ExtensionData::StatusRequest)
}

pub fn supported_groups(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SupportedGroups(ext::u16_list(cur)?))
}

pub fn signature_algorithms(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SignatureAlgorithms(ext::u16_list(cur)?))
}

pub fn signature_algorithms_cert(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SignatureAlgorithmsCert(ext::u16_list(cur)?))
}

pub fn alpn(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.is_empty() {
        return Err(Malformed("empty protocol list"));
    }
    let mut protos = Vec::new();
    while !list.is_empty() {
        protos.push(ext::protocol_name(&mut list)?);
    }
    Ok(ExtensionData::AlpnOffers(protos))
}

/// Clients signal SCT support with an empty body.
pub fn sct_request(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::SignedCertificateTimestampRequest)
}

pub fn post_handshake_auth(_: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    Ok(ExtensionData::PostHandshakeAuth)
}

/// Empty for a fresh request, otherwise the ticket being resumed.
pub fn session_ticket(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let len = cur.remaining();
    Ok(ExtensionData::SessionTicket(cur.read_fixed(len)?.to_vec()))
}

pub fn pre_shared_key(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    if list.is_empty() {
        return Err(Malformed("empty PSK identity list"));
    }
    let mut identities = Vec::new();
    while !list.is_empty() {
        let identity = list.read_u16_length_prefixed()?;
        if identity.is_empty() {
            return Err(Malformed("empty PSK identity"));
        }
        identities.push(PskIdentity {
            identity: identity.rest().to_vec(),
            obfuscated_ticket_age: list.read_u32()?,
        });
    }

    let mut list = cur.read_u16_length_prefixed()?;
    let mut binders = Vec::new();
    while !list.is_empty() {
        binders.push(list.read_u8_length_prefixed()?.rest().to_vec());
    }
    if binders.len() != identities.len() {
        return Err(Malformed("PSK binder count differs from identity count"));
    }

    Ok(ExtensionData::PskOffer {
        identities,
        binders,
    })
}

pub fn supported_versions(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u8_length_prefixed()?;
    if list.is_empty() || list.remaining() % 2 != 0 {
        return Err(Malformed("bad supported versions length"));
    }
    let mut versions = Vec::with_capacity(list.remaining() / 2);
    while !list.is_empty() {
        versions.push(list.read_u16()?);
    }
    Ok(ExtensionData::SupportedVersions(versions))
}

pub fn psk_key_exchange_modes(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let modes = cur.read_u8_length_prefixed()?;
    if modes.is_empty() {
        return Err(Malformed("empty PSK mode list"));
    }
    Ok(ExtensionData::PskKeyExchangeModes(modes.rest().to_vec()))
}

/// Client key shares; the list may be empty when the client waits for a
/// HelloRetryRequest to pick the group.
pub fn key_shares(cur: &mut Cursor<'_>) -> Result<ExtensionData, Malformed> {
    let mut list = cur.read_u16_length_prefixed()?;
    let mut shares = Vec::new();
    while !list.is_empty() {
        let group = list.read_u16()?;
        let data = list.read_u16_length_prefixed()?;
        if data.is_empty() {
            return Err(Malformed("empty key exchange data"));
        }
        shares.push(KeyShare::Share {
            group,
            data: data.rest().to_vec(),
        });
    }
    Ok(ExtensionData::KeyShares(shares))
}
