//! Dump decoded frames from a capture file, one line per frame.
//! `.gz` and `.xz` inputs are decompressed by extension; `FrameReader`
//! itself also auto-detects gzip, so a bare `.gz` works either way.

use clap::Parser;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use wavetap::FrameReader;

#[derive(Parser)]
struct Args {
    /// Path to a tcpdump-format (or gzip/xz-compressed) capture.
    path: PathBuf,

    /// Stop after this many frames.
    #[arg(long)]
    limit: Option<usize>,

    #[arg(short, long)]
    verbose: bool,
}

fn open(path: &PathBuf) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Ok(Box::new(flate2::read::GzDecoder::new(file))),
        Some("xz") => Ok(Box::new(xz2::read::XzDecoder::new(file))),
        _ => Ok(Box::new(file)),
    }
}

fn main() {
    let args = Args::parse();
    let log_level = if args.verbose { log::LevelFilter::Info } else { log::LevelFilter::Warn };
    env_logger::Builder::new().filter(None, log_level).init();

    let source = open(&args.path).expect("failed to open capture");
    let reader = FrameReader::new(source).expect("failed to sniff input stream");

    let start = Instant::now();
    let mut n = 0u64;
    for frame in reader {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                eprintln!("fatal: {}", e);
                std::process::exit(1);
            }
        };
        let ts = SystemTime::UNIX_EPOCH + Duration::from_secs_f64(frame.pcap_secs);
        println!(
            "[{}] {:>6} {:<12} rate={:<6} ta={} ra={} ssid={}",
            humantime::format_rfc3339_nanos(ts),
            frame.orig_len,
            frame.typestr,
            frame.rate.map(|r| format!("{:.1}", r)).unwrap_or_default(),
            frame.ta.map(|m| m.to_string()).unwrap_or_default(),
            frame.ra.map(|m| m.to_string()).unwrap_or_default(),
            frame.ssid.as_deref().unwrap_or(""),
        );
        n += 1;
        if n % 1000 == 0 {
            let secs = start.elapsed().as_secs_f64();
            log::info!("read {} frames at {:.0} fps", n, n as f64 / secs);
        }
        if args.limit.map(|l| n as usize >= l).unwrap_or(false) {
            break;
        }
    }
    log::info!("dumped {} frames", n);
}
