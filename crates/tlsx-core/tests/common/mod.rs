//! Byte builders for hand-crafted hello payloads.
#![allow(dead_code)]

pub fn u16_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

pub fn u8_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = vec![data.len() as u8];
    out.extend_from_slice(data);
    out
}

pub fn extension(id: u16, body: &[u8]) -> Vec<u8> {
    let mut out = id.to_be_bytes().to_vec();
    out.extend_from_slice(&u16_prefixed(body));
    out
}

/// Extensions block from `(id, body)` entries.
pub fn extensions(entries: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let inner: Vec<u8> = entries
        .iter()
        .flat_map(|(id, body)| extension(*id, body))
        .collect();
    u16_prefixed(&inner)
}

/// Wrap a handshake body in a handshake header and a TLS record header.
pub fn record(handshake_type: u8, body: &[u8]) -> Vec<u8> {
    let len = body.len();
    let record_len = (len + 4) as u16;
    let mut out = vec![0x16, 0x03, 0x03];
    out.extend_from_slice(&record_len.to_be_bytes());
    out.push(handshake_type);
    out.extend_from_slice(&[(len >> 16) as u8, (len >> 8) as u8, len as u8]);
    out.extend_from_slice(body);
    out
}

pub struct ServerHelloBuilder {
    pub version: u16,
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    pub cipher_suite: u16,
    pub extensions: Option<Vec<u8>>,
}

impl Default for ServerHelloBuilder {
    fn default() -> Self {
        Self {
            version: 0x0303,
            random: [0; 32],
            session_id: Vec::new(),
            cipher_suite: 0xC02F,
            extensions: None,
        }
    }
}

impl ServerHelloBuilder {
    pub fn with_extensions(mut self, entries: &[(u16, Vec<u8>)]) -> Self {
        self.extensions = Some(extensions(entries));
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut body = self.version.to_be_bytes().to_vec();
        body.extend_from_slice(&self.random);
        body.extend_from_slice(&u8_prefixed(&self.session_id));
        body.extend_from_slice(&self.cipher_suite.to_be_bytes());
        body.push(0);
        if let Some(exts) = &self.extensions {
            body.extend_from_slice(exts);
        }
        body
    }

    pub fn payload(&self) -> Vec<u8> {
        record(0x02, &self.body())
    }
}

pub struct ClientHelloBuilder {
    pub cipher_suites: Vec<u16>,
    pub session_id: Vec<u8>,
    pub extensions: Option<Vec<u8>>,
}

impl Default for ClientHelloBuilder {
    fn default() -> Self {
        Self {
            cipher_suites: vec![0x1301, 0x1302, 0xC02F],
            session_id: vec![0xCD; 32],
            extensions: None,
        }
    }
}

impl ClientHelloBuilder {
    pub fn with_extensions(mut self, entries: &[(u16, Vec<u8>)]) -> Self {
        self.extensions = Some(extensions(entries));
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0xAB; 32]);
        body.extend_from_slice(&u8_prefixed(&self.session_id));
        let suites: Vec<u8> = self
            .cipher_suites
            .iter()
            .flat_map(|s| s.to_be_bytes())
            .collect();
        body.extend_from_slice(&u16_prefixed(&suites));
        body.extend_from_slice(&u8_prefixed(&[0]));
        if let Some(exts) = &self.extensions {
            body.extend_from_slice(exts);
        }
        body
    }

    pub fn payload(&self) -> Vec<u8> {
        record(0x01, &self.body())
    }
}
