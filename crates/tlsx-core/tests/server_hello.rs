mod common;

use common::{record, u16_prefixed, u8_prefixed, ServerHelloBuilder};
use tlsx_core::fingerprint::compute_ja3s;
use tlsx_core::hello::types::HELLO_RETRY_REQUEST_RANDOM;
use tlsx_core::hello::{ids, ExtensionData, HandshakeType, KeyShare};
use tlsx_core::{classify_server_hello, ParseError, ParseMode, ServerHello};

fn alpn_body(proto: &[u8]) -> Vec<u8> {
    u16_prefixed(&u8_prefixed(proto))
}

#[test]
fn tls12_hello_with_alpn() {
    let payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::ALPN, alpn_body(b"h2"))])
        .payload();

    let sh = classify_server_hello(&payload, ParseMode::Full)
        .unwrap()
        .expect("ServerHello");
    assert_eq!(sh.version, 0x0303);
    assert_eq!(sh.random, [0u8; 32]);
    assert!(sh.session_id.is_empty());
    assert_eq!(sh.cipher_suite, 0xC02F);
    assert_eq!(sh.compression_method, 0);
    assert_eq!(sh.alpn_protocol(), Some("h2"));
    assert_eq!(sh.raw.as_slice(), &payload[5..]);
    assert!(!sh.is_hello_retry_request());
}

#[test]
fn every_server_extension_decodes() {
    let sct_list = u16_prefixed(&[u16_prefixed(&[0x01; 4]), u16_prefixed(&[0x02; 3])].concat());
    let mut key_share = 0x001du16.to_be_bytes().to_vec();
    key_share.extend_from_slice(&u16_prefixed(&[0x5A; 32]));
    let npn = [u8_prefixed(b"spdy/3"), u8_prefixed(b"http/1.1")].concat();

    let payload = ServerHelloBuilder {
        session_id: vec![0x42; 32],
        ..Default::default()
    }
    .with_extensions(&[
        (ids::NEXT_PROTOCOL_NEGOTIATION, npn),
        (ids::STATUS_REQUEST, vec![]),
        (ids::SESSION_TICKET, vec![]),
        (ids::RENEGOTIATION_INFO, vec![0x00]),
        (ids::ALPN, alpn_body(b"http/1.1")),
        (ids::SIGNED_CERTIFICATE_TIMESTAMP, sct_list),
        (ids::SUPPORTED_VERSIONS, vec![0x03, 0x04]),
        (ids::KEY_SHARE, key_share),
        (ids::PRE_SHARED_KEY, vec![0x00, 0x01]),
        (ids::EXTENDED_MASTER_SECRET, vec![]),
        (0xABCD, vec![0xDE, 0xAD, 0xBE, 0xEF]),
    ])
    .payload();

    let sh = ServerHello::parse(&payload).unwrap();
    assert_eq!(sh.extensions.len(), 11);
    assert_eq!(sh.session_id, vec![0x42; 32]);
    assert!(sh.next_proto_neg());
    assert_eq!(sh.next_protocols(), &["spdy/3".to_string(), "http/1.1".to_string()]);
    assert!(sh.ocsp_stapling());
    assert!(sh.ticket_supported());
    assert_eq!(sh.secure_renegotiation(), Some(&[][..]));
    assert_eq!(sh.alpn_protocol(), Some("http/1.1"));
    assert_eq!(sh.scts(), &[vec![0x01; 4], vec![0x02; 3]]);
    assert_eq!(sh.supported_version(), Some(0x0304));
    assert_eq!(sh.negotiated_version(), 0x0304);
    assert_eq!(
        sh.key_share(),
        Some(&KeyShare::Share {
            group: 0x001d,
            data: vec![0x5A; 32]
        })
    );
    assert_eq!(sh.selected_group(), None);
    assert_eq!(sh.selected_identity(), Some(1));
    assert!(sh.extended_master_secret());
    assert_eq!(sh.extensions.get(0xABCD), Some(&ExtensionData::Unrecognized));
    assert_eq!(sh.extensions.ids().last(), Some(&0xABCD));
}

#[test]
fn hello_retry_request() {
    let payload = ServerHelloBuilder {
        random: HELLO_RETRY_REQUEST_RANDOM,
        cipher_suite: 0x1301,
        ..Default::default()
    }
    .with_extensions(&[
        (ids::SUPPORTED_VERSIONS, vec![0x03, 0x04]),
        (ids::KEY_SHARE, vec![0x00, 0x17]),
        (ids::COOKIE, u16_prefixed(&[0xC0; 16])),
    ])
    .payload();

    let hrr = ServerHello::parse(&payload).unwrap();
    assert!(hrr.is_hello_retry_request());
    assert_eq!(hrr.selected_group(), Some(0x0017));
    assert_eq!(hrr.key_share().and_then(KeyShare::data), None);
    assert_eq!(hrr.cookie(), Some(&[0xC0; 16][..]));
}

#[test]
fn key_share_forms_share_the_group() {
    let bare = ServerHelloBuilder::default()
        .with_extensions(&[(ids::KEY_SHARE, vec![0x00, 0x1d])])
        .payload();
    let mut full_body = vec![0x00, 0x1d];
    full_body.extend_from_slice(&u16_prefixed(&[0x11; 32]));
    let full = ServerHelloBuilder::default()
        .with_extensions(&[(ids::KEY_SHARE, full_body)])
        .payload();

    let bare = ServerHello::parse(&bare).unwrap();
    let full = ServerHello::parse(&full).unwrap();
    assert_eq!(bare.key_share(), Some(&KeyShare::Group(0x001d)));
    assert_eq!(
        bare.key_share().map(KeyShare::group),
        full.key_share().map(KeyShare::group)
    );
    assert_eq!(full.key_share().and_then(KeyShare::data).map(<[u8]>::len), Some(32));
}

#[test]
fn client_hello_is_wrong_type_for_server_classifier() {
    let payload = common::ClientHelloBuilder::default().payload();
    assert_eq!(classify_server_hello(&payload, ParseMode::Full), Ok(None));
    assert_eq!(
        ServerHello::parse(&payload),
        Err(ParseError::WrongMessageType {
            expected: HandshakeType::ServerHello,
            content_type: 0x16,
            handshake_type: 0x01,
        })
    );
}

#[test]
fn truncated_by_one_byte() {
    let mut payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::ALPN, alpn_body(b"h2"))])
        .payload();
    payload.pop();
    assert!(matches!(
        ServerHello::parse(&payload),
        Err(ParseError::InvalidLength { .. })
    ));

    // Same cut, but with a handshake length that agrees with it: now only the
    // extensions block overruns.
    let mut body = ServerHelloBuilder::default()
        .with_extensions(&[(ids::ALPN, alpn_body(b"h2"))])
        .body();
    body.pop();
    assert!(matches!(
        ServerHello::parse(&record(0x02, &body)),
        Err(ParseError::InvalidLength { declared: 9, available: 8 })
    ));
}

#[test]
fn leftover_extension_bytes() {
    let payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::STATUS_REQUEST, vec![0x00])])
        .payload();
    assert_eq!(
        ServerHello::parse(&payload),
        Err(ParseError::MalformedExtension {
            id: ids::STATUS_REQUEST,
            reason: "trailing bytes in extension body",
        })
    );

    let mut alpn = alpn_body(b"h2");
    alpn.push(0x00);
    let payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::ALPN, alpn)])
        .payload();
    assert!(matches!(
        ServerHello::parse(&payload),
        Err(ParseError::MalformedExtension { id: ids::ALPN, .. })
    ));
}

#[test]
fn identifier_only_extensions_accept_any_body() {
    for (id, body) in [
        (ids::EXTENDED_MASTER_SECRET, vec![0x01]),
        (ids::EC_POINT_FORMATS, u8_prefixed(&[])),
        (ids::SERVER_NAME, vec![0x00, 0x00]),
        (ids::RECORD_SIZE_LIMIT, vec![0x40]),
        (ids::EARLY_DATA, vec![0x00, 0x00, 0x00, 0x01]),
    ] {
        let payload = ServerHelloBuilder::default()
            .with_extensions(&[(id, body)])
            .payload();
        let sh = ServerHello::parse(&payload).unwrap_or_else(|e| panic!("id {}: {}", id, e));
        assert_eq!(sh.extensions.ids(), &[id]);
        assert_eq!(sh.extensions.get(id), Some(&ExtensionData::Unrecognized));
    }
}

#[test]
fn repeated_extensions_in_one_block() {
    let sct = |body: &[u8]| u16_prefixed(&u16_prefixed(body));
    let payload = ServerHelloBuilder::default()
        .with_extensions(&[
            (ids::NEXT_PROTOCOL_NEGOTIATION, u8_prefixed(b"spdy/3")),
            (ids::SUPPORTED_VERSIONS, vec![0x03, 0x03]),
            (ids::SIGNED_CERTIFICATE_TIMESTAMP, sct(&[0xAA])),
            (ids::NEXT_PROTOCOL_NEGOTIATION, u8_prefixed(b"h2")),
            (ids::SIGNED_CERTIFICATE_TIMESTAMP, sct(&[0xBB, 0xCC])),
            (ids::SUPPORTED_VERSIONS, vec![0x03, 0x04]),
        ])
        .payload();

    let sh = ServerHello::parse(&payload).unwrap();
    assert_eq!(sh.next_protocols(), &["spdy/3".to_string(), "h2".to_string()]);
    assert_eq!(sh.scts(), &[vec![0xAA], vec![0xBB, 0xCC]]);
    assert_eq!(sh.supported_version(), Some(0x0304));
    assert_eq!(
        sh.extensions.ids(),
        &[
            ids::NEXT_PROTOCOL_NEGOTIATION,
            ids::SUPPORTED_VERSIONS,
            ids::SIGNED_CERTIFICATE_TIMESTAMP
        ]
    );
    assert_eq!(sh.extensions.wire_ids().len(), 6);
    assert_eq!(
        compute_ja3s(&sh).raw_string,
        "771,49199,13172-43-18-13172-18-43"
    );
}

#[test]
fn bytes_inside_message_after_extensions() {
    let mut body = ServerHelloBuilder::default()
        .with_extensions(&[(ids::SESSION_TICKET, vec![])])
        .body();
    body.push(0x00);
    assert_eq!(
        ServerHello::parse(&record(0x02, &body)),
        Err(ParseError::TrailingData(1))
    );
}

#[test]
fn following_record_in_same_segment_is_ignored() {
    let mut payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::RENEGOTIATION_INFO, vec![0x00])])
        .payload();
    // Start of a Certificate record.
    payload.extend_from_slice(&[0x16, 0x03, 0x03, 0x0f, 0xa0, 0x0b]);

    let sh = ServerHello::parse(&payload).unwrap();
    assert!(sh.secure_renegotiation().is_some());
    assert_eq!(sh.raw.len(), payload.len() - 5 - 6);
}

#[test]
fn minimal_and_full_agree_on_fixed_fields() {
    let payload = ServerHelloBuilder {
        session_id: vec![0x07; 16],
        cipher_suite: 0x1302,
        ..Default::default()
    }
    .with_extensions(&[
        (ids::SUPPORTED_VERSIONS, vec![0x03, 0x04]),
        (ids::ALPN, alpn_body(b"h2")),
    ])
    .payload();

    let full = ServerHello::parse(&payload).unwrap();
    let minimal = classify_server_hello(&payload, ParseMode::Minimal)
        .unwrap()
        .unwrap();

    assert_eq!(minimal.version, full.version);
    assert_eq!(minimal.random, full.random);
    assert_eq!(minimal.session_id, full.session_id);
    assert_eq!(minimal.cipher_suite, full.cipher_suite);
    assert_eq!(minimal.compression_method, full.compression_method);
    assert_eq!(minimal.raw, full.raw);
    assert!(minimal.extensions.is_empty());
    assert_eq!(full.extensions.len(), 2);
}

#[test]
fn decodes_independently_on_many_threads() {
    let payload = ServerHelloBuilder::default()
        .with_extensions(&[(ids::ALPN, alpn_body(b"h2"))])
        .payload();

    let results: Vec<ServerHello> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| ServerHello::parse(&payload).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|sh| sh.alpn_protocol() == Some("h2")));
}

#[test]
fn ja3s_from_decoded_hello() {
    let payload = ServerHelloBuilder {
        version: 0x0304,
        cipher_suite: 0x1301,
        ..Default::default()
    }
    .with_extensions(&[
        (ids::SUPPORTED_VERSIONS, vec![0x03, 0x04]),
        (ids::KEY_SHARE, vec![0x00, 0x1d]),
    ])
    .payload();

    let ja3s = compute_ja3s(&ServerHello::parse(&payload).unwrap());
    assert_eq!(ja3s.raw_string, "772,4865,43-51");
    assert_eq!(ja3s.hash, "fd45585efaa8bdce5097aa7539274dac");
}
