//! Buckets per-frame airtime into a fixed-width grid of columns, picking
//! the single busiest transmitter in each column and giving it a short,
//! stable display label. Grounded on `airflow.py`'s `_main()`: it keeps
//! one `most_airtime` triple per column (the single largest-airtime
//! packet among non-bad-FCS transmitters, not a per-transmitter sum),
//! and lowercases based on the column's total airtime across every
//! packet, not just the winner's share. Persistent alias/OUI lookup is
//! out of scope; the per-column abbreviation below is just a display
//! label, assigned for the lifetime of this visualizer, not looked up
//! from any vendor table.

use crate::frame::Frame;
use crate::mac::MacAddr;
use std::collections::HashMap;

/// Columns span this many microseconds of capture time.
pub const USEC_PER_ROW: u64 = 1_024_000 / 2;
pub const COLS_PER_ROW: u64 = 64;
pub const USEC_PER_COL: u64 = USEC_PER_ROW / COLS_PER_ROW;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The single largest-airtime non-bad-FCS packet seen in a column, plus
/// the column's total airtime across every packet (bad FCS included).
#[derive(Debug, Default, Clone)]
struct ColumnTally {
    total_airtime_usec: f64,
    busiest: Option<(MacAddr, f64, bool)>, // (ta, airtime, is_beacon)
}

/// Accumulates airtime into fixed-width columns and renders each one
/// as a single character: the busiest real (non-bad-FCS) transmitter's
/// label, lowercased under light utilization, or `.` for a beacon.
pub struct AirtimeVisualizer {
    col_usec: u64,
    next_col_start: u64,
    current: ColumnTally,
    finished_cols: Vec<char>,
    labels: HashMap<MacAddr, char>,
    next_label: usize,
}

impl AirtimeVisualizer {
    pub fn new() -> Self {
        AirtimeVisualizer {
            col_usec: USEC_PER_COL,
            next_col_start: 0,
            current: ColumnTally::default(),
            finished_cols: Vec::new(),
            labels: HashMap::new(),
            next_label: 0,
        }
    }

    fn label_for(&mut self, mac: MacAddr) -> char {
        if let Some(&c) = self.labels.get(&mac) {
            return c;
        }
        let c = ALPHABET[self.next_label % ALPHABET.len()] as char;
        self.next_label += 1;
        self.labels.insert(mac, c);
        c
    }

    /// Feed one decoded frame. Control frames (fulltype 0x10-0x1F) carry
    /// no airtime of interest and are skipped, matching `airflow.py`.
    pub fn observe(&mut self, frame: &Frame, mac_usecs: u64) {
        if let Some(t) = frame.frame_type {
            if (0x10..=0x1f).contains(&t) {
                return;
            }
        }
        let airtime = frame.airtime_usec.unwrap_or(0.0);

        while mac_usecs >= self.next_col_start + self.col_usec {
            self.flush_column();
        }

        self.current.total_airtime_usec += airtime;

        if !frame.bad {
            if let Some(mac) = frame.ta {
                let beats_current_winner = match self.current.busiest {
                    Some((_, best_airtime, _)) => airtime > best_airtime,
                    None => true,
                };
                if beats_current_winner {
                    self.current.busiest = Some((mac, airtime, frame.typestr == "08 Beacon"));
                }
            }
        }
    }

    fn flush_column(&mut self) {
        let tally = std::mem::take(&mut self.current);
        self.next_col_start += self.col_usec;

        let ch = match tally.busiest {
            None => ' ',
            Some((mac, _, is_beacon)) => {
                if is_beacon {
                    '.'
                } else {
                    let label = self.label_for(mac);
                    if tally.total_airtime_usec < self.col_usec as f64 / 2.0 {
                        label.to_ascii_lowercase()
                    } else {
                        label
                    }
                }
            }
        };
        self.finished_cols.push(ch);
    }

    /// Render and clear any columns not yet flushed by arriving data.
    pub fn finish(&mut self) -> String {
        self.flush_column();
        std::mem::take(&mut self.finished_cols).into_iter().collect()
    }

    /// Completed columns so far, oldest first, without ending the row.
    pub fn rendered_so_far(&self) -> String {
        self.finished_cols.iter().collect()
    }
}

impl Default for AirtimeVisualizer {
    fn default() -> Self {
        AirtimeVisualizer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(mac: MacAddr, airtime: f64, frame_type: u8, typestr: &str, bad: bool) -> Frame {
        Frame {
            ta: Some(mac),
            airtime_usec: Some(airtime),
            frame_type: Some(frame_type),
            typestr: typestr.to_string(),
            bad,
            ..Frame::default()
        }
    }

    #[test]
    fn control_frames_do_not_occupy_a_column() {
        let mut vis = AirtimeVisualizer::new();
        let mac = MacAddr([1; 6]);
        vis.observe(&frame(mac, 1000.0, 0x1c, "1C CTS", false), 0);
        let out = vis.finish();
        assert_eq!(out, " ");
    }

    #[test]
    fn busiest_transmitter_gets_its_label_uppercase_when_saturated() {
        let mut vis = AirtimeVisualizer::new();
        let mac = MacAddr([2; 6]);
        vis.observe(&frame(mac, USEC_PER_COL as f64, 0x28, "28 QosData", false), 0);
        let out = vis.finish();
        assert_eq!(out, "a");
    }

    #[test]
    fn light_utilization_is_lowercased() {
        let mut vis = AirtimeVisualizer::new();
        // Burn through the lowercase half of the alphabet so this MAC's
        // label would otherwise print uppercase.
        for i in 0..26u8 {
            vis.label_for(MacAddr([i, 0, 0, 0, 0, 0]));
        }
        let mac = MacAddr([3; 6]);
        vis.observe(&frame(mac, 1.0, 0x28, "28 QosData", false), 0);
        let out = vis.finish();
        assert_eq!(out, "a"); // lowercased from the uppercase 'A' it would have earned
    }

    #[test]
    fn beacon_column_is_a_dot_regardless_of_airtime() {
        let mut vis = AirtimeVisualizer::new();
        let mac = MacAddr([4; 6]);
        vis.observe(&frame(mac, USEC_PER_COL as f64, 0x08, "08 Beacon", false), 0);
        let out = vis.finish();
        assert_eq!(out, ".");
    }

    #[test]
    fn bad_fcs_frames_do_not_count_toward_any_mac() {
        let mut vis = AirtimeVisualizer::new();
        let mac = MacAddr([5; 6]);
        vis.observe(&frame(mac, USEC_PER_COL as f64, 0x28, "28 QosData", true), 0);
        let out = vis.finish();
        assert_eq!(out, " ");
    }

    #[test]
    fn advancing_time_flushes_earlier_columns() {
        let mut vis = AirtimeVisualizer::new();
        let mac = MacAddr([6; 6]);
        vis.observe(&frame(mac, USEC_PER_COL as f64, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(mac, USEC_PER_COL as f64, 0x28, "28 QosData", false), USEC_PER_COL * 3);
        assert_eq!(vis.rendered_so_far(), "a  ");
    }

    #[test]
    fn winner_is_the_single_largest_packet_not_the_transmitter_with_the_highest_sum() {
        let mut vis = AirtimeVisualizer::new();
        let small_often = MacAddr([7; 6]);
        let big_once = MacAddr([8; 6]);
        // Three small packets from one MAC would out-sum one big packet
        // from another, but the winner is still the single biggest packet.
        let quarter = USEC_PER_COL as f64 / 4.0;
        vis.observe(&frame(small_often, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(small_often, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(small_often, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(big_once, quarter * 2.0, 0x28, "28 QosData", false), 0);
        let out = vis.finish();
        assert_eq!(out, "a"); // big_once gets the first label, not small_often
    }

    #[test]
    fn lowercasing_is_based_on_the_columns_total_airtime_not_the_winners_share() {
        let mut vis = AirtimeVisualizer::new();
        let winner = MacAddr([9; 6]);
        let other_a = MacAddr([10; 6]);
        let other_b = MacAddr([11; 6]);
        let other_c = MacAddr([12; 6]);
        let quarter = USEC_PER_COL as f64 / 4.0;
        // The winner's own packet is well under half a column, but three
        // equally-sized packets from other transmitters push the column's
        // total airtime over half.
        vis.observe(&frame(winner, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(other_a, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(other_b, quarter, 0x28, "28 QosData", false), 0);
        vis.observe(&frame(other_c, quarter, 0x28, "28 QosData", false), 0);
        let out = vis.finish();
        assert_eq!(out, "A"); // uppercase: column total is saturated even though the winner's own share isn't
    }
}
