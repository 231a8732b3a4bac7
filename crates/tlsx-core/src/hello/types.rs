use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::fingerprint::grease::is_grease_u16;
use crate::hello::extensions::ids;

/// Handshake message kinds this crate decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeType {
    ClientHello = 0x01,
    ServerHello = 0x02,
}

impl fmt::Display for HandshakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeType::ClientHello => f.write_str("ClientHello"),
            HandshakeType::ServerHello => f.write_str("ServerHello"),
        }
    }
}

/// Random value a HelloRetryRequest carries in place of a server random
/// (RFC 8446, Section 4.1.3).
pub const HELLO_RETRY_REQUEST_RANDOM: [u8; 32] = [
    0xCF, 0x21, 0xAD, 0x74, 0xE5, 0x9A, 0x61, 0x11, 0xBE, 0x1D, 0x8C, 0x02, 0x1E, 0x65, 0xB8, 0x91,
    0xC2, 0xA2, 0x11, 0x16, 0x7A, 0xBB, 0x8C, 0x5E, 0x07, 0x9E, 0x09, 0xE2, 0xC8, 0xA8, 0x33, 0x9C,
];

/// TLS 1.3 key share (RFC 8446, Section 4.2.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyShare {
    /// Group alone, as selected by a HelloRetryRequest.
    Group(u16),
    /// Group with its key exchange data.
    Share { group: u16, data: Vec<u8> },
}

impl KeyShare {
    pub fn group(&self) -> u16 {
        match self {
            KeyShare::Group(group) | KeyShare::Share { group, .. } => *group,
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        match self {
            KeyShare::Group(_) => None,
            KeyShare::Share { data, .. } => Some(data),
        }
    }
}

/// One identity offered in a ClientHello pre_shared_key extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PskIdentity {
    pub identity: Vec<u8>,
    pub obfuscated_ticket_age: u32,
}

/// Decoded payload of a single extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionData {
    /// SNI host name from a ClientHello, or `None` for a server's empty acknowledgement.
    ServerName(Option<String>),
    StatusRequest,
    SupportedGroups(Vec<u16>),
    EcPointFormats(Vec<u8>),
    SignatureAlgorithms(Vec<u16>),
    SignatureAlgorithmsCert(Vec<u16>),
    /// Protocols offered by a client.
    AlpnOffers(Vec<String>),
    /// Protocol selected by a server.
    Alpn(String),
    SignedCertificateTimestampRequest,
    SignedCertificateTimestamps(Vec<Vec<u8>>),
    ExtendedMasterSecret,
    RecordSizeLimit(u16),
    SessionTicket(Vec<u8>),
    PskOffer {
        identities: Vec<PskIdentity>,
        binders: Vec<Vec<u8>>,
    },
    /// Index of the identity a server accepted.
    PreSharedKey(u16),
    EarlyData,
    SupportedVersions(Vec<u16>),
    SupportedVersion(u16),
    Cookie(Vec<u8>),
    PskKeyExchangeModes(Vec<u8>),
    PostHandshakeAuth,
    KeyShares(Vec<KeyShare>),
    KeyShare(KeyShare),
    NextProtocolNegotiation(Vec<String>),
    RenegotiationInfo(Vec<u8>),
    /// Identifier without a registered decoder.
    Unrecognized,
}

/// Extensions of one hello, keyed by identifier.
///
/// Identifiers keep the order in which they first appeared on the wire.
/// A repeated identifier replaces the earlier value, except for the list
/// extensions (next protocols, SCTs) which accumulate. Every occurrence,
/// repeats included, is also kept in `wire_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    order: Vec<u16>,
    wire: Vec<u16>,
    entries: HashMap<u16, ExtensionData>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u16, data: ExtensionData) {
        self.wire.push(id);
        match self.entries.entry(id) {
            Entry::Vacant(slot) => {
                self.order.push(id);
                slot.insert(data);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), data) {
                (
                    ExtensionData::NextProtocolNegotiation(seen),
                    ExtensionData::NextProtocolNegotiation(more),
                ) => seen.extend(more),
                (
                    ExtensionData::SignedCertificateTimestamps(seen),
                    ExtensionData::SignedCertificateTimestamps(more),
                ) => seen.extend(more),
                (_, data) => {
                    slot.insert(data);
                }
            },
        }
    }

    pub fn get(&self, id: u16) -> Option<&ExtensionData> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.entries.contains_key(&id)
    }

    /// Identifiers in first-seen wire order.
    pub fn ids(&self) -> &[u16] {
        &self.order
    }

    /// Every identifier as it occurred on the wire, repeats included.
    pub fn wire_ids(&self) -> &[u16] {
        &self.wire
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &ExtensionData)> + '_ {
        self.order.iter().map(|id| (*id, &self.entries[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A decoded ClientHello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Handshake header and body exactly as captured.
    pub raw: Vec<u8>,
    pub version: u16,
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    /// Cipher suites in wire order, GREASE values included.
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Vec<u8>,
    pub extensions: Extensions,
}

impl ClientHello {
    pub fn server_name(&self) -> Option<&str> {
        match self.extensions.get(ids::SERVER_NAME) {
            Some(ExtensionData::ServerName(name)) => name.as_deref(),
            _ => None,
        }
    }

    pub fn alpn_protocols(&self) -> &[String] {
        match self.extensions.get(ids::ALPN) {
            Some(ExtensionData::AlpnOffers(protocols)) => protocols,
            _ => &[],
        }
    }

    pub fn supported_versions(&self) -> &[u16] {
        match self.extensions.get(ids::SUPPORTED_VERSIONS) {
            Some(ExtensionData::SupportedVersions(versions)) => versions,
            _ => &[],
        }
    }

    pub fn supported_groups(&self) -> &[u16] {
        match self.extensions.get(ids::SUPPORTED_GROUPS) {
            Some(ExtensionData::SupportedGroups(groups)) => groups,
            _ => &[],
        }
    }

    pub fn ec_point_formats(&self) -> &[u8] {
        match self.extensions.get(ids::EC_POINT_FORMATS) {
            Some(ExtensionData::EcPointFormats(formats)) => formats,
            _ => &[],
        }
    }

    pub fn signature_algorithms(&self) -> &[u16] {
        match self.extensions.get(ids::SIGNATURE_ALGORITHMS) {
            Some(ExtensionData::SignatureAlgorithms(algs)) => algs,
            _ => &[],
        }
    }

    pub fn key_share_groups(&self) -> Vec<u16> {
        match self.extensions.get(ids::KEY_SHARE) {
            Some(ExtensionData::KeyShares(shares)) => shares.iter().map(KeyShare::group).collect(),
            _ => Vec::new(),
        }
    }

    pub fn ocsp_stapling(&self) -> bool {
        self.extensions.contains(ids::STATUS_REQUEST)
    }

    pub fn ticket_supported(&self) -> bool {
        self.extensions.contains(ids::SESSION_TICKET)
    }

    /// Whether any cipher suite, extension, group or version is a GREASE value.
    pub fn has_grease(&self) -> bool {
        self.cipher_suites
            .iter()
            .chain(self.extensions.ids())
            .chain(self.supported_groups())
            .chain(self.supported_versions())
            .any(|v| is_grease_u16(*v))
    }
}

/// A decoded ServerHello or HelloRetryRequest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Handshake header and body exactly as captured.
    pub raw: Vec<u8>,
    pub version: u16,
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    pub cipher_suite: u16,
    pub compression_method: u8,
    pub extensions: Extensions,
}

impl ServerHello {
    pub fn is_hello_retry_request(&self) -> bool {
        self.random == HELLO_RETRY_REQUEST_RANDOM
    }

    /// The version from supported_versions when present, else the legacy field.
    pub fn negotiated_version(&self) -> u16 {
        self.supported_version().unwrap_or(self.version)
    }

    pub fn supported_version(&self) -> Option<u16> {
        match self.extensions.get(ids::SUPPORTED_VERSIONS) {
            Some(ExtensionData::SupportedVersion(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn alpn_protocol(&self) -> Option<&str> {
        match self.extensions.get(ids::ALPN) {
            Some(ExtensionData::Alpn(proto)) => Some(proto),
            _ => None,
        }
    }

    pub fn next_protocols(&self) -> &[String] {
        match self.extensions.get(ids::NEXT_PROTOCOL_NEGOTIATION) {
            Some(ExtensionData::NextProtocolNegotiation(protos)) => protos,
            _ => &[],
        }
    }

    pub fn next_proto_neg(&self) -> bool {
        self.extensions.contains(ids::NEXT_PROTOCOL_NEGOTIATION)
    }

    pub fn ocsp_stapling(&self) -> bool {
        self.extensions.contains(ids::STATUS_REQUEST)
    }

    pub fn ticket_supported(&self) -> bool {
        self.extensions.contains(ids::SESSION_TICKET)
    }

    pub fn extended_master_secret(&self) -> bool {
        self.extensions.contains(ids::EXTENDED_MASTER_SECRET)
    }

    pub fn secure_renegotiation(&self) -> Option<&[u8]> {
        match self.extensions.get(ids::RENEGOTIATION_INFO) {
            Some(ExtensionData::RenegotiationInfo(data)) => Some(data),
            _ => None,
        }
    }

    pub fn scts(&self) -> &[Vec<u8>] {
        match self.extensions.get(ids::SIGNED_CERTIFICATE_TIMESTAMP) {
            Some(ExtensionData::SignedCertificateTimestamps(scts)) => scts,
            _ => &[],
        }
    }

    pub fn key_share(&self) -> Option<&KeyShare> {
        match self.extensions.get(ids::KEY_SHARE) {
            Some(ExtensionData::KeyShare(share)) => Some(share),
            _ => None,
        }
    }

    /// Group requested by a HelloRetryRequest key_share.
    pub fn selected_group(&self) -> Option<u16> {
        match self.key_share() {
            Some(KeyShare::Group(group)) => Some(*group),
            _ => None,
        }
    }

    pub fn selected_identity(&self) -> Option<u16> {
        match self.extensions.get(ids::PRE_SHARED_KEY) {
            Some(ExtensionData::PreSharedKey(index)) => Some(*index),
            _ => None,
        }
    }

    pub fn cookie(&self) -> Option<&[u8]> {
        match self.extensions.get(ids::COOKIE) {
            Some(ExtensionData::Cookie(cookie)) => Some(cookie),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_extension_last_wins() {
        let mut exts = Extensions::new();
        exts.insert(ids::SUPPORTED_VERSIONS, ExtensionData::SupportedVersion(0x0303));
        exts.insert(ids::ALPN, ExtensionData::Alpn("http/1.1".into()));
        exts.insert(ids::SUPPORTED_VERSIONS, ExtensionData::SupportedVersion(0x0304));

        assert_eq!(exts.ids(), &[ids::SUPPORTED_VERSIONS, ids::ALPN]);
        assert_eq!(
            exts.wire_ids(),
            &[ids::SUPPORTED_VERSIONS, ids::ALPN, ids::SUPPORTED_VERSIONS]
        );
        assert_eq!(
            exts.get(ids::SUPPORTED_VERSIONS),
            Some(&ExtensionData::SupportedVersion(0x0304))
        );
    }

    #[test]
    fn list_extensions_accumulate() {
        let mut exts = Extensions::new();
        exts.insert(
            ids::NEXT_PROTOCOL_NEGOTIATION,
            ExtensionData::NextProtocolNegotiation(vec!["spdy/3".into()]),
        );
        exts.insert(
            ids::NEXT_PROTOCOL_NEGOTIATION,
            ExtensionData::NextProtocolNegotiation(vec!["http/1.1".into()]),
        );
        exts.insert(
            ids::SIGNED_CERTIFICATE_TIMESTAMP,
            ExtensionData::SignedCertificateTimestamps(vec![vec![1]]),
        );
        exts.insert(
            ids::SIGNED_CERTIFICATE_TIMESTAMP,
            ExtensionData::SignedCertificateTimestamps(vec![vec![2, 3]]),
        );

        assert_eq!(exts.len(), 2);
        assert_eq!(
            exts.get(ids::NEXT_PROTOCOL_NEGOTIATION),
            Some(&ExtensionData::NextProtocolNegotiation(vec![
                "spdy/3".into(),
                "http/1.1".into()
            ]))
        );
        assert_eq!(
            exts.get(ids::SIGNED_CERTIFICATE_TIMESTAMP),
            Some(&ExtensionData::SignedCertificateTimestamps(vec![vec![1], vec![2, 3]]))
        );
    }

    #[test]
    fn key_share_accessors() {
        let bare = KeyShare::Group(0x001d);
        let full = KeyShare::Share {
            group: 0x001d,
            data: vec![0xAB; 32],
        };
        assert_eq!(bare.group(), full.group());
        assert_eq!(bare.data(), None);
        assert_eq!(full.data().map(<[u8]>::len), Some(32));
    }

    #[test]
    fn handshake_type_display() {
        assert_eq!(HandshakeType::ClientHello.to_string(), "ClientHello");
        assert_eq!(HandshakeType::ServerHello as u8, 0x02);
    }
}
