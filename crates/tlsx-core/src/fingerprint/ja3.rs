use md5::{Digest, Md5};

use crate::fingerprint::grease::without_grease;
use crate::hello::{ClientHello, ServerHello};

/// Result of a JA3 or JA3S fingerprint computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Result {
    /// 32-character MD5 hex hash
    pub hash: String,
    /// The raw string before hashing
    pub raw_string: String,
}

fn dashed<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

fn md5_hex(raw_string: String) -> Ja3Result {
    let mut hasher = Md5::new();
    hasher.update(raw_string.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Ja3Result { hash, raw_string }
}

/// JA3 of a ClientHello:
/// MD5(SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats)
///
/// Decimal values, dash-separated within a field, GREASE filtered. Extension
/// ids appear in wire order, a repeated id once per occurrence.
pub fn compute_ja3(hello: &ClientHello) -> Ja3Result {
    md5_hex(format!(
        "{},{},{},{},{}",
        hello.version,
        dashed(without_grease(&hello.cipher_suites)),
        dashed(without_grease(hello.extensions.wire_ids())),
        dashed(without_grease(hello.supported_groups())),
        dashed(hello.ec_point_formats().iter()),
    ))
}

/// JA3S of a ServerHello: MD5(SSLVersion,Cipher,Extensions)
pub fn compute_ja3s(hello: &ServerHello) -> Ja3Result {
    md5_hex(format!(
        "{},{},{}",
        hello.version,
        hello.cipher_suite,
        dashed(hello.extensions.wire_ids().iter()),
    ))
}
