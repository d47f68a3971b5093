//! Per-AP/per-station packet and RSSI histograms, built on top of the
//! decoded frame stream. Grounded on `wifitop.py`'s `StationData`/
//! `_GotPacket`/`RateArt`; the global mutable counters and curses UI
//! loop are reimplemented here as an owned aggregator object.

use crate::frame::Frame;
use crate::mac::MacAddr;
use std::collections::HashMap;

const RATE_BIN_MAX: usize = 9;
const RATE_BIN_SHOW_MAX: usize = 7;

const CONTROL_RANGE: std::ops::RangeInclusive<u8> = 0x10..=0x1f;
const DATA_RANGE: std::ops::RangeInclusive<u8> = 0x20..=0x2f;

/// Either a real station, or the special "this row is the AP itself" slot.
pub type StationKey = Option<MacAddr>;

#[derive(Debug, Clone, Default)]
pub struct StationStats {
    pub packets_tx: [u32; RATE_BIN_MAX + 1],
    pub packets_rx: [u32; RATE_BIN_MAX + 1],
    pub rssi: HashMap<i8, u32>,
    pub last_typestr: String,
    pub is_ap: bool,
}

impl StationStats {
    fn rssi_avg(&self) -> Option<i32> {
        if self.rssi.is_empty() {
            return None;
        }
        let (total, count): (i64, i64) =
            self.rssi.iter().fold((0, 0), |(t, c), (&rssi, &n)| (t + rssi as i64 * n as i64, c + n as i64));
        Some((total / (1 + count)) as i32)
    }
}

#[derive(Default)]
pub struct TopAggregator {
    pub packet_count: u64,
    pub bad_count: u64,
    stations: HashMap<MacAddr, HashMap<StationKey, StationStats>>,
}

impl TopAggregator {
    pub fn new() -> Self {
        TopAggregator::default()
    }

    pub fn observe(&mut self, frame: &Frame) {
        self.packet_count += 1;
        if frame.bad {
            self.bad_count += 1;
        }
        let frame_type = match frame.frame_type {
            Some(t) => t,
            None => return,
        };
        if CONTROL_RANGE.contains(&frame_type) {
            return;
        }

        let (down, ap_mac, sta_mac) = match frame.dsmode {
            Some(2) => (true, frame.ta, frame.ra),
            Some(1) => (false, frame.ra, frame.ta),
            _ => return, // dsmode 0 could be either AP or STA; ignore
        };
        let ap_mac = match ap_mac {
            Some(m) => m,
            None => return,
        };
        let sta_key: StationKey = sta_mac.map(|m| if m.is_multicast() { MULTICAST } else { m });

        if frame.bad && !self.stations.contains_key(&ap_mac) {
            return;
        }
        let ap_arr = self.stations.entry(ap_mac).or_default();
        if frame.bad && !ap_arr.contains_key(&sta_key) {
            return;
        }

        if DATA_RANGE.contains(&frame_type) {
            let rate_bin = (frame.mcs.unwrap_or(0) as usize).min(RATE_BIN_MAX);
            {
                let ap = ap_arr.entry(None).or_default();
                if down {
                    ap.packets_tx[rate_bin] += 1;
                } else {
                    ap.packets_rx[rate_bin] += 1;
                }
            }
            let sta = ap_arr.entry(sta_key).or_default();
            if down {
                sta.packets_rx[rate_bin] += 1;
            } else {
                sta.packets_tx[rate_bin] += 1;
            }
        }

        let sta = ap_arr.entry(sta_key).or_default();
        sta.last_typestr = frame.typestr.clone();
        if let Some(dbm) = frame.dbm_antsignal {
            if down {
                ap_arr.entry(None).or_default().rssi.entry(dbm).and_modify(|c| *c += 1).or_insert(1);
            } else {
                ap_arr.entry(sta_key).or_default().rssi.entry(dbm).and_modify(|c| *c += 1).or_insert(1);
            }
        }
        if down && frame.typestr == "08 Beacon" {
            ap_arr.entry(None).or_default().is_ap = true;
        }
    }

    /// Rows sorted by total traffic, busiest first — matches the
    /// `sorted(..., key=lambda: -sum(tx)-sum(rx))` ordering in `wifitop.py`.
    pub fn rows(&self) -> Vec<(MacAddr, StationKey, &StationStats)> {
        let mut aps: Vec<_> = self.stations.iter().collect();
        aps.sort_by_key(|(_, arr)| std::cmp::Reverse(traffic_total(arr.get(&None))));
        let mut rows = Vec::new();
        for (ap_mac, arr) in aps {
            let mut stas: Vec<_> = arr.iter().collect();
            stas.sort_by_key(|(_, stats)| std::cmp::Reverse(traffic_of(stats)));
            for (sta_key, stats) in stas {
                rows.push((*ap_mac, *sta_key, stats));
            }
        }
        rows
    }
}

/// Sentinel for a multicast receiver, grouping all multicast traffic
/// under one synthetic key (`wifitop.py` uses the literal string
/// `'MCAST'` for the same purpose).
const MULTICAST: MacAddr = MacAddr([0x01, 0, 0, 0, 0, 0]);

fn traffic_of(s: &StationStats) -> u64 {
    s.packets_tx.iter().chain(s.packets_rx.iter()).map(|&n| n as u64).sum()
}

fn traffic_total(s: Option<&StationStats>) -> u64 {
    s.map(traffic_of).unwrap_or(0)
}

/// Render a rate-bin histogram the way `wifitop.py`'s `RateArt` does:
/// bins at or above `maxbin` are folded into one "fast enough" bucket,
/// the dominant bin gets its digit, moderately active bins get `*`,
/// barely active bins get `.`, empty bins get a space.
pub fn rate_art(bins: &[u32; RATE_BIN_MAX + 1], maxbin: usize) -> String {
    let mut fixed: Vec<u32> = bins[..maxbin].to_vec();
    fixed.push(bins[maxbin..].iter().sum());

    let mut most_i = 0;
    let mut most = 1u32;
    for (i, &v) in fixed.iter().enumerate() {
        if v >= most {
            most_i = i;
            most = v;
        }
    }

    fixed
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v == 0 {
                ' '
            } else if v >= most {
                if i == maxbin {
                    char::from_digit(most_i as u32, 10).unwrap_or('?')
                } else {
                    char::from_digit(i as u32, 10).unwrap_or('?')
                }
            } else if v > most / 20 {
                '*'
            } else {
                '.'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::MacAddr;

    fn frame(dsmode: u8, ta: MacAddr, ra: MacAddr, frame_type: u8, typestr: &str) -> Frame {
        Frame {
            dsmode: Some(dsmode),
            ta: Some(ta),
            ra: Some(ra),
            frame_type: Some(frame_type),
            typestr: typestr.to_string(),
            ..Frame::default()
        }
    }

    #[test]
    fn data_frame_from_ap_counts_as_tx_for_ap_rx_for_station() {
        let ap = MacAddr([1, 1, 1, 1, 1, 1]);
        let sta = MacAddr([2, 2, 2, 2, 2, 2]);
        let mut f = frame(2, ap, sta, 0x28, "28 QosData"); // dsmode=2 (down), ta=ap, ra=sta
        f.mcs = Some(3);
        let mut agg = TopAggregator::new();
        agg.observe(&f);
        let ap_arr = agg.stations.get(&ap).unwrap();
        assert_eq!(ap_arr[&None].packets_tx[3], 1);
        assert_eq!(ap_arr[&Some(sta)].packets_rx[3], 1);
    }

    #[test]
    fn control_frames_are_ignored() {
        let ap = MacAddr([1; 6]);
        let sta = MacAddr([2; 6]);
        let f = frame(2, ap, sta, 0x1c, "1C CTS");
        let mut agg = TopAggregator::new();
        agg.observe(&f);
        assert!(agg.stations.is_empty());
        assert_eq!(agg.packet_count, 1);
    }

    #[test]
    fn rate_art_marks_the_dominant_bin_with_its_digit() {
        let mut bins = [0u32; RATE_BIN_MAX + 1];
        bins[2] = 10;
        bins[0] = 1;
        let art = rate_art(&bins, RATE_BIN_SHOW_MAX);
        assert_eq!(art.chars().nth(2), Some('2'));
    }
}
