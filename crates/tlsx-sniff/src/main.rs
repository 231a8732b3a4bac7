use anyhow::Result;
use clap::Parser;
use tracing::info;

use tlsx_core::ParseMode;

mod capture;
mod output;
mod packet;

use capture::{CaptureOptions, Source};

#[derive(Parser)]
#[command(name = "tlsx-sniff")]
#[command(about = "Passive TLS hello decoder: prints ClientHellos and ServerHellos seen in TCP traffic")]
struct Cli {
    /// Network interface to capture on (e.g., eth0, wlan0).
    /// If neither this nor --pcap is given, lists available interfaces and exits.
    #[arg(short, long)]
    interface: Option<String>,

    /// Read packets from a pcap file instead of a live interface
    #[arg(short = 'r', long, conflicts_with = "interface")]
    pcap: Option<std::path::PathBuf>,

    /// BPF filter expression
    #[arg(short, long, default_value = "tcp")]
    filter: String,

    /// Enable promiscuous mode (capture all traffic on the segment)
    #[arg(short, long, default_value_t = false)]
    promisc: bool,

    /// Snap length: max bytes captured per packet (Ethernet MTU + header)
    #[arg(short, long, default_value_t = 1514)]
    snaplen: i32,

    /// Which hellos to report: "client", "server" or "both"
    #[arg(long, default_value = "both")]
    hello: String,

    /// Decode fixed fields only and skip extensions (cheaper, no fingerprints)
    #[arg(long, default_value_t = false)]
    minimal: bool,

    /// Print verbose output (extension ids, raw JA3/JA3S strings)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so NDJSON on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let source = match (cli.interface, cli.pcap) {
        (Some(iface), _) => Source::Live {
            iface,
            promisc: cli.promisc,
            snaplen: cli.snaplen,
        },
        (None, Some(path)) => Source::Offline(path),
        (None, None) => {
            capture::list_interfaces()?;
            return Ok(());
        }
    };

    let opts = CaptureOptions {
        source,
        bpf_filter: cli.filter,
        hello_filter: packet::HelloFilter::parse(&cli.hello)?,
        mode: if cli.minimal {
            ParseMode::Minimal
        } else {
            ParseMode::Full
        },
        format: output::OutputFormat::parse(&cli.output)?,
        verbose: cli.verbose,
    };

    info!("BPF filter: {}", opts.bpf_filter);
    info!("Decode mode: {:?}", opts.mode);
    info!("Press Ctrl+C to stop\n");

    capture::run_capture(opts).await
}
