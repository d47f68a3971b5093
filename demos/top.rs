//! Aggregate a capture into per-AP/per-station traffic stats and print
//! a static table, sorted busiest-first. (The original's live curses
//! redraw loop is a terminal-UI concern, not a library one; this demo
//! shows the same aggregation over a finished file instead of a live
//! `tcpdump` pipe.)

use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use wavetap::top::{rate_art, TopAggregator};
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

    let mut agg = TopAggregator::new();
    for frame in reader {
        match frame {
            Ok(f) => agg.observe(&f),
            Err(e) => {
                eprintln!("fatal: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("{:<17} {:<17} {:>10} {:>10}  tx        rx", "AP", "STA", "last seen", "");
    for (ap, sta, stats) in agg.rows() {
        let sta_label = sta.map(|m| m.to_string()).unwrap_or_else(|| "(self)".to_string());
        println!(
            "{:<17} {:<17} {:<18} {}  {}",
            ap,
            sta_label,
            stats.last_typestr,
            rate_art(&stats.packets_tx, 7),
            rate_art(&stats.packets_rx, 7),
        );
    }
    log::info!("{} packets observed, {} bad FCS", agg.packet_count, agg.bad_count);
}
