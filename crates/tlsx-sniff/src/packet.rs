use std::net::IpAddr;

use anyhow::{bail, Result};
use etherparse::{NetSlice, SlicedPacket, TransportSlice};

use tlsx_core::fingerprint::{compute_ja3, compute_ja3s, Ja3Result};
use tlsx_core::hello::frame::CONTENT_TYPE_HANDSHAKE;
use tlsx_core::{
    classify_client_hello, classify_server_hello, ClientHello, ParseError, ParseMode, ServerHello,
};

/// Identifies a unidirectional TCP flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl std::fmt::Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port
        )
    }
}

/// One TCP segment's payload, detached from the capture buffer.
pub struct PacketInfo {
    pub flow: FlowKey,
    pub tcp_payload: Vec<u8>,
}

/// Which hello kinds to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelloFilter {
    Client,
    Server,
    Both,
}

impl HelloFilter {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            "both" => Ok(Self::Both),
            _ => bail!(
                "Invalid hello kind '{}'. Expected 'client', 'server' or 'both'.",
                s
            ),
        }
    }

    fn client(self) -> bool {
        matches!(self, Self::Client | Self::Both)
    }

    fn server(self) -> bool {
        matches!(self, Self::Server | Self::Both)
    }
}

#[derive(Debug)]
pub enum Hello {
    Client(ClientHello),
    Server(ServerHello),
}

/// A decoded hello and where it was seen.
#[derive(Debug)]
pub struct HelloResult {
    pub flow: FlowKey,
    pub hello: Hello,
    /// JA3 for a ClientHello, JA3S for a ServerHello. Only computed when
    /// extensions were decoded.
    pub fingerprint: Option<Ja3Result>,
}

/// Split an Ethernet frame down to the TCP segment a hello would ride in.
///
/// Segments without payload yield `Ok(None)`; frames that carry no IP or
/// no TCP header are errors, and never reach the decoder.
pub fn parse_packet(raw: &[u8]) -> Result<Option<PacketInfo>> {
    let sliced = SlicedPacket::from_ethernet(raw)?;

    let (src_ip, dst_ip) = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let hdr = ipv4.header();
            (
                IpAddr::V4(hdr.source_addr()),
                IpAddr::V4(hdr.destination_addr()),
            )
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let hdr = ipv6.header();
            (
                IpAddr::V6(hdr.source_addr()),
                IpAddr::V6(hdr.destination_addr()),
            )
        }
        _ => bail!("No IP header found"),
    };

    let Some(TransportSlice::Tcp(tcp)) = &sliced.transport else {
        bail!("Not a TCP packet");
    };
    if tcp.payload().is_empty() {
        return Ok(None);
    }

    Ok(Some(PacketInfo {
        flow: FlowKey {
            src_ip,
            src_port: tcp.source_port(),
            dst_ip,
            dst_port: tcp.destination_port(),
        },
        tcp_payload: tcp.payload().to_vec(),
    }))
}

/// A segment too short to frame a hello that does not open a handshake
/// record either. Plain non-TLS traffic, not a broken hello.
pub fn is_non_tls(pkt: &PacketInfo, err: &ParseError) -> bool {
    matches!(err, ParseError::ShortMessage { .. })
        && pkt.tcp_payload.first() != Some(&CONTENT_TYPE_HANDSHAKE)
}

/// Decode the hello carried by a single segment, if any.
///
/// `Ok(None)` covers every segment that is not a hello of a requested kind.
/// A hello that continues in a later segment is reported as an error rather
/// than reassembled.
pub fn inspect(
    pkt: &PacketInfo,
    filter: HelloFilter,
    mode: ParseMode,
) -> Result<Option<HelloResult>, ParseError> {
    let fingerprint = mode == ParseMode::Full;

    if filter.client() {
        if let Some(ch) = classify_client_hello(&pkt.tcp_payload, mode)? {
            return Ok(Some(HelloResult {
                flow: pkt.flow,
                fingerprint: fingerprint.then(|| compute_ja3(&ch)),
                hello: Hello::Client(ch),
            }));
        }
    }

    if filter.server() {
        if let Some(sh) = classify_server_hello(&pkt.tcp_payload, mode)? {
            return Ok(Some(HelloResult {
                flow: pkt.flow,
                fingerprint: fingerprint.then(|| compute_ja3s(&sh)),
                hello: Hello::Server(sh),
            }));
        }
    }

    Ok(None)
}
