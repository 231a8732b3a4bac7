use std::io::{self, Write};

use serde::Serialize;

use tlsx_core::hello::KeyShare;

use crate::packet::{Hello, HelloResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

fn version_name(v: u16) -> String {
    match v {
        0x0300 => "SSL 3.0".to_string(),
        0x0301 => "TLS 1.0".to_string(),
        0x0302 => "TLS 1.1".to_string(),
        0x0303 => "TLS 1.2".to_string(),
        0x0304 => "TLS 1.3".to_string(),
        _ => format!("0x{:04x}", v),
    }
}

fn hex_list(values: &[u16]) -> Vec<String> {
    values.iter().map(|v| format!("0x{:04x}", v)).collect()
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    kind: &'static str,
    src_ip: String,
    src_port: u16,
    dst_ip: String,
    dst_port: u16,
    tls_version: String,
    session_id_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sni: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    supported_versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cipher_suite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cipher_suites: Option<usize>,
    extensions: Vec<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alpn: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    key_share_groups: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    hello_retry_request: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ocsp_stapling: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    session_ticket: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ja3_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ja3_raw: Option<&'a str>,
}

/// Write one decoded hello to stdout.
pub fn print_hello(result: &HelloResult, format: OutputFormat, verbose: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => write_text(&mut out, result, verbose),
        OutputFormat::Json => write_json(&mut out, result, verbose),
    }
}

fn write_text(out: &mut impl Write, result: &HelloResult, verbose: bool) -> io::Result<()> {
    let flow = &result.flow;
    let (label, fp_label) = match result.hello {
        Hello::Client(_) => ("ClientHello", "JA3: "),
        Hello::Server(ref sh) if sh.is_hello_retry_request() => ("HelloRetryRequest", "JA3S:"),
        Hello::Server(_) => ("ServerHello", "JA3S:"),
    };

    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(out, "  {}", label)?;
    writeln!(out, "  Source:     {}:{}", flow.src_ip, flow.src_port)?;
    writeln!(out, "  Dest:       {}:{}", flow.dst_ip, flow.dst_port)?;

    match &result.hello {
        Hello::Client(ch) => {
            writeln!(out, "  SNI:        {}", ch.server_name().unwrap_or("(none)"))?;
            writeln!(out, "  TLS ver:    {}", version_name(ch.version))?;
            if !ch.supported_versions().is_empty() {
                writeln!(out, "  Sup. vers:  {}", hex_list(ch.supported_versions()).join(", "))?;
            }
            writeln!(out, "  Ciphers:    {} suites", ch.cipher_suites.len())?;
            writeln!(out, "  Extensions: {} types", ch.extensions.len())?;
            if !ch.alpn_protocols().is_empty() {
                writeln!(out, "  ALPN:       {}", ch.alpn_protocols().join(", "))?;
            }
            if !ch.key_share_groups().is_empty() {
                writeln!(out, "  Key shares: {}", hex_list(&ch.key_share_groups()).join(", "))?;
            }
        }
        Hello::Server(sh) => {
            writeln!(out, "  TLS ver:    {}", version_name(sh.negotiated_version()))?;
            writeln!(out, "  Cipher:     0x{:04x}", sh.cipher_suite)?;
            writeln!(out, "  Extensions: {} types", sh.extensions.len())?;
            if let Some(proto) = sh.alpn_protocol() {
                writeln!(out, "  ALPN:       {}", proto)?;
            }
            match sh.key_share() {
                Some(KeyShare::Group(group)) => writeln!(out, "  Retry grp:  0x{:04x}", group)?,
                Some(share) => writeln!(out, "  Key share:  0x{:04x}", share.group())?,
                None => {}
            }
            if sh.ocsp_stapling() || !sh.scts().is_empty() {
                writeln!(
                    out,
                    "  OCSP/SCT:   {} / {}",
                    sh.ocsp_stapling(),
                    sh.scts().len()
                )?;
            }
        }
    }

    if verbose {
        let ids = match &result.hello {
            Hello::Client(ch) => ch.extensions.ids(),
            Hello::Server(sh) => sh.extensions.ids(),
        };
        writeln!(out, "  Ext. ids:   {:?}", ids)?;
    }

    if let Some(fp) = &result.fingerprint {
        writeln!(out, "  ──────────────────────────────────────────────────")?;
        writeln!(out, "  {}       {}", fp_label, fp.hash)?;
        if verbose {
            writeln!(out, "  raw:        {}", fp.raw_string)?;
        }
    }
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n")
}

fn json_record(result: &HelloResult, verbose: bool) -> JsonRecord<'_> {
    let flow = &result.flow;
    let fp = result.fingerprint.as_ref();
    let mut record = JsonRecord {
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        kind: "",
        src_ip: flow.src_ip.to_string(),
        src_port: flow.src_port,
        dst_ip: flow.dst_ip.to_string(),
        dst_port: flow.dst_port,
        tls_version: String::new(),
        session_id_len: 0,
        sni: None,
        supported_versions: Vec::new(),
        cipher_suite: None,
        cipher_suites: None,
        extensions: Vec::new(),
        alpn: Vec::new(),
        key_share_groups: Vec::new(),
        hello_retry_request: false,
        ocsp_stapling: false,
        session_ticket: false,
        scts: None,
        ja3_hash: fp.map(|f| f.hash.as_str()),
        ja3_raw: fp.filter(|_| verbose).map(|f| f.raw_string.as_str()),
    };

    match &result.hello {
        Hello::Client(ch) => {
            record.kind = "client_hello";
            record.tls_version = version_name(ch.version);
            record.session_id_len = ch.session_id.len();
            record.sni = ch.server_name();
            record.supported_versions = hex_list(ch.supported_versions());
            record.cipher_suites = Some(ch.cipher_suites.len());
            record.extensions = ch.extensions.ids().to_vec();
            record.alpn = ch.alpn_protocols().iter().map(String::as_str).collect();
            record.key_share_groups = hex_list(&ch.key_share_groups());
            record.ocsp_stapling = ch.ocsp_stapling();
            record.session_ticket = ch.ticket_supported();
        }
        Hello::Server(sh) => {
            record.kind = "server_hello";
            record.tls_version = version_name(sh.negotiated_version());
            record.session_id_len = sh.session_id.len();
            record.cipher_suite = Some(format!("0x{:04x}", sh.cipher_suite));
            record.extensions = sh.extensions.ids().to_vec();
            record.alpn = sh.alpn_protocol().into_iter().collect();
            record.key_share_groups = sh
                .key_share()
                .map(|share| format!("0x{:04x}", share.group()))
                .into_iter()
                .collect();
            record.hello_retry_request = sh.is_hello_retry_request();
            record.ocsp_stapling = sh.ocsp_stapling();
            record.session_ticket = sh.ticket_supported();
            record.scts = Some(sh.scts().len()).filter(|n| *n > 0);
        }
    }
    record
}

fn write_json(out: &mut impl Write, result: &HelloResult, verbose: bool) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &json_record(result, verbose))?;
    writeln!(out)
}
