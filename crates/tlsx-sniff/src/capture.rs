use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use pcap::{Activated, Capture, Device};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use tlsx_core::{ParseError, ParseMode};

use crate::output::{self, OutputFormat};
use crate::packet::{self, Hello, HelloFilter, HelloResult, PacketInfo};

/// Packets buffered between the capture thread and the decode workers.
const CHANNEL_DEPTH: usize = 1024;

/// Where packets come from.
pub enum Source {
    Live {
        iface: String,
        promisc: bool,
        snaplen: i32,
    },
    Offline(PathBuf),
}

pub struct CaptureOptions {
    pub source: Source,
    pub bpf_filter: String,
    pub hello_filter: HelloFilter,
    pub mode: ParseMode,
    pub format: OutputFormat,
    pub verbose: bool,
}

#[derive(Debug, Default)]
struct Stats {
    segments: u64,
    non_tls: u64,
    client_hellos: u64,
    server_hellos: u64,
    malformed: u64,
}

/// List all available network interfaces.
pub fn list_interfaces() -> Result<()> {
    let devices =
        Device::list().context("Failed to list network devices. Do you have permission?")?;

    if devices.is_empty() {
        println!("No network interfaces found.");
        println!("Hint: run with sudo or set CAP_NET_RAW capability.");
        return Ok(());
    }

    println!("Available interfaces:");
    for dev in &devices {
        let desc = dev.desc.as_deref().unwrap_or("");
        let addrs: Vec<String> = dev.addresses.iter().map(|a| a.addr.to_string()).collect();
        let addr_str = if addrs.is_empty() {
            "(no addresses)".to_string()
        } else {
            addrs.join(", ")
        };
        println!("  {:<16} {} [{}]", dev.name, desc, addr_str);
    }

    println!("\nUsage: tlsx-sniff -i <interface> | tlsx-sniff -r <file.pcap>");
    Ok(())
}

/// Capture packets and decode one TCP payload per task until the source is
/// exhausted (offline), fails, or Ctrl+C is pressed.
pub async fn run_capture(opts: CaptureOptions) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(CHANNEL_DEPTH);
    let source = opts.source;
    let bpf_filter = opts.bpf_filter;
    let reader = tokio::task::spawn_blocking(move || read_packets(source, &bpf_filter, tx));

    let mut workers = JoinSet::new();
    let mut stats = Stats::default();
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let pkt = tokio::select! {
            pkt = rx.recv() => match pkt {
                Some(pkt) => pkt,
                None => break,
            },
            res = &mut interrupted => {
                res.context("Failed to listen for Ctrl+C")?;
                info!("Interrupted, finishing in-flight decodes");
                break;
            }
        };
        stats.segments += 1;
        let (filter, mode) = (opts.hello_filter, opts.mode);
        workers.spawn(async move {
            let found = packet::inspect(&pkt, filter, mode);
            (pkt, found)
        });

        while let Some(done) = workers.try_join_next() {
            report(done, opts.format, opts.verbose, &mut stats)?;
        }
    }

    // Closing the channel tells the capture thread to stop.
    drop(rx);
    while let Some(done) = workers.join_next().await {
        report(done, opts.format, opts.verbose, &mut stats)?;
    }

    let captured = reader.await.context("Capture thread panicked")??;
    info!(
        "{} packets read, {} TCP payloads ({} non-TLS): {} ClientHello, {} ServerHello, {} malformed",
        captured,
        stats.segments,
        stats.non_tls,
        stats.client_hellos,
        stats.server_hellos,
        stats.malformed
    );
    Ok(())
}

type Inspected = (PacketInfo, Result<Option<HelloResult>, ParseError>);

fn report(
    done: Result<Inspected, JoinError>,
    format: OutputFormat,
    verbose: bool,
    stats: &mut Stats,
) -> Result<()> {
    let (pkt, found) = done.context("Decode task failed")?;
    match found {
        Ok(Some(result)) => {
            match result.hello {
                Hello::Client(_) => stats.client_hellos += 1,
                Hello::Server(_) => stats.server_hellos += 1,
            }
            output::print_hello(&result, format, verbose).context("Failed to write output")?;
        }
        Ok(None) => {}
        Err(e) if packet::is_non_tls(&pkt, &e) => stats.non_tls += 1,
        Err(e) => {
            stats.malformed += 1;
            debug!("Hello decode error: {} ({})", e, pkt.flow);
        }
    }
    Ok(())
}

/// Blocking half: open the source and feed TCP payloads to the workers.
/// Returns the number of packets read.
fn read_packets(source: Source, bpf_filter: &str, tx: mpsc::Sender<PacketInfo>) -> Result<u64> {
    match source {
        Source::Live {
            iface,
            promisc,
            snaplen,
        } => {
            let cap = Capture::from_device(iface.as_str())
                .with_context(|| {
                    format!(
                        "Failed to open interface '{}'.\n\
                         Hint: run with sudo or: sudo setcap cap_net_raw+ep <binary>",
                        iface
                    )
                })?
                .promisc(promisc)
                .snaplen(snaplen)
                .timeout(1000)
                .open()
                .with_context(|| {
                    format!(
                        "Failed to activate capture on '{}'. Permission denied?\n\
                         Hint: sudo setcap cap_net_raw+ep <binary>",
                        iface
                    )
                })?;
            info!("Capturing on interface: {}", iface);
            drain(cap, bpf_filter, &tx)
        }
        Source::Offline(path) => {
            let cap = Capture::from_file(&path)
                .with_context(|| format!("Failed to open capture file '{}'", path.display()))?;
            info!("Reading capture file: {}", path.display());
            drain(cap, bpf_filter, &tx)
        }
    }
}

fn drain<T: Activated>(
    mut cap: Capture<T>,
    bpf_filter: &str,
    tx: &mpsc::Sender<PacketInfo>,
) -> Result<u64> {
    cap.filter(bpf_filter, true)
        .with_context(|| format!("Invalid BPF filter: '{}'", bpf_filter))?;
    debug!("BPF filter applied: {}", bpf_filter);

    let mut packets = 0u64;
    loop {
        match cap.next_packet() {
            Ok(packet) => {
                packets += 1;
                match packet::parse_packet(packet.data) {
                    Ok(Some(pkt)) => {
                        if tx.blocking_send(pkt).is_err() {
                            debug!("Decode side closed, stopping capture");
                            return Ok(packets);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => debug!("Packet parse error: {}", e),
                }
            }
            Err(pcap::Error::TimeoutExpired) if tx.is_closed() => return Ok(packets),
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(pcap::Error::NoMorePackets) => return Ok(packets),
            Err(e) => {
                error!("Capture error: {}", e);
                bail!("Capture terminated: {}", e);
            }
        }
    }
}
