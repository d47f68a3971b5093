//! Render a capture as a scrolling airtime-utilization strip, one
//! character per ~8ms column, one line per ~0.5s row.

use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use wavetap::airtime::{AirtimeVisualizer, USEC_PER_ROW};
use wavetap::FrameReader;

#[derive(Parser)]
struct Args {
    path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.path).expect("failed to open capture");
    let reader = FrameReader::new(file).expect("failed to sniff input stream");

    let mut vis = AirtimeVisualizer::new();
    let mut rows = 0;
    let mut row_start_secs: Option<f64> = None;

    for frame in reader {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                eprintln!("fatal: {}", e);
                std::process::exit(1);
            }
        };
        let mac_usecs = match frame.mac_usecs {
            Some(t) => t,
            None => continue,
        };
        if row_start_secs.is_none() {
            row_start_secs = Some(frame.pcap_secs);
        }
        vis.observe(&frame, mac_usecs);

        if mac_usecs >= (rows as u64 + 1) * USEC_PER_ROW {
            println!("{:>12.3}  {}", row_start_secs.unwrap_or(frame.pcap_secs), vis.finish());
            rows += 1;
            row_start_secs = Some(frame.pcap_secs);
        }
    }
    let tail = vis.finish();
    if !tail.is_empty() {
        println!("{:>12.3}  {}", row_start_secs.unwrap_or(0.0), tail);
    }
}
