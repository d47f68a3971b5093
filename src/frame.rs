//! `FrameAssembler` drives pcap framing, radiotap decoding, 802.11
//! decoding and rate derivation, inherits TA across CTS/ACK frames, and
//! exposes both a pull (`FrameReader`, an `Iterator`) and a push
//! (`Packetizer`) interface over the same decode logic. Grounded on
//! `wifipacket.py`'s `PacketizeBuf` (the shared logic), `Packetize`
//! (pull) and `Packetizer` (push).

use crate::buffer::ByteBuffer;
use crate::dot11;
use crate::error::{Error, Result};
use crate::mac::MacAddr;
use crate::pcap::{self, GlobalHeader};
use crate::radiotap;
use crate::rate;
use crate::stream::sniff_gzip;
use std::io::Read;
use tracing::{trace, warn};

/// The flags bit marking a CRC-failed capture.
const BAD_FCS: u8 = 0x40;

/// One decoded, enriched frame record: pcap metadata, radiotap PHY
/// fields, and the 802.11 MAC header, flattened into a plain record of
/// optional fields rather than `wifipacket.py`'s dynamic `opt` bag.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub pcap_secs: f64,
    pub incl_len: u32,
    pub orig_len: u32,
    pub mac_usecs: Option<u64>,
    pub flags: Option<u8>,
    pub bad: bool,
    pub rate: Option<f64>,
    pub mcs: Option<u8>,
    pub spatialstreams: Option<u8>,
    pub bw: Option<u32>,
    pub airtime_usec: Option<f64>,
    pub freq: Option<u16>,
    pub channel_flags: Option<u16>,
    pub dbm_antsignal: Option<i8>,
    pub dbm_antnoise: Option<i8>,
    pub frame_type: Option<u8>,
    pub typestr: String,
    pub dsmode: Option<u8>,
    pub retry: bool,
    pub powerman: bool,
    pub order: bool,
    pub duration: Option<u16>,
    pub ta: Option<MacAddr>,
    pub ra: Option<MacAddr>,
    pub xa: Option<MacAddr>,
    pub seq: Option<u16>,
    pub frag: Option<u8>,
    pub ssid: Option<String>,
}

/// Shared decode state machine: `Start -> Header -> RecordHeader <->
/// RecordBody`, with no terminal state on success (EOF ends the
/// sequence). Used by both `FrameReader` and `Packetizer`.
#[derive(Default)]
pub struct FrameAssembler {
    buf: ByteBuffer,
    header: Option<GlobalHeader>,
    last_ta: Option<MacAddr>,
    last_ra: Option<MacAddr>,
    last_mac_usecs: Option<u64>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        FrameAssembler::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.put(bytes.to_vec());
    }

    /// Attempt to produce the next frame. `Ok(None)` is `NeedsMore`.
    pub fn try_next(&mut self) -> Result<Option<Frame>> {
        if self.header.is_none() {
            match pcap::try_parse_global_header(&mut self.buf)? {
                None => {
                    trace!("needs more bytes for the global header");
                    return Ok(None);
                }
                Some(h) => self.header = Some(h),
            }
        }
        let header = *self.header.as_ref().expect("just set");

        let record = match pcap::try_parse_record(&mut self.buf, &header)? {
            None => {
                trace!("needs more bytes for the next record");
                return Ok(None);
            }
            Some(r) => r,
        };

        Ok(Some(self.decode_record(record)))
    }

    fn decode_record(&mut self, record: pcap::RawRecord) -> Frame {
        let mut frame = Frame {
            pcap_secs: record.pcap_secs,
            incl_len: record.incl_len,
            orig_len: record.orig_len,
            ..Frame::default()
        };

        let (rt, body) = match radiotap::parse(&record.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("dropping radiotap fields for this record: {}", e);
                return frame;
            }
        };

        frame.mac_usecs = rt.mac_usecs;
        frame.flags = rt.flags;
        frame.bad = rt.flags.unwrap_or(0) & BAD_FCS != 0;
        frame.freq = rt.freq;
        frame.channel_flags = rt.channel_flags;
        frame.dbm_antsignal = rt.dbm_antsignal;
        frame.dbm_antnoise = rt.dbm_antnoise;

        if let Some(vht) = rt.vht {
            let r = rate::vht_rate(&vht);
            frame.rate = Some(r.rate_mbps);
            frame.mcs = Some(r.mcs);
            frame.spatialstreams = Some(r.spatialstreams);
            frame.bw = Some(r.bw_mhz);
        } else if let Some(ht) = rt.ht {
            let r = rate::ht_rate(&ht);
            frame.rate = Some(r.rate_mbps);
            frame.mcs = Some(r.mcs);
            frame.spatialstreams = Some(r.spatialstreams);
            frame.bw = Some(r.bw_mhz);
        } else if let Some(raw) = rt.rate_raw {
            frame.rate = Some(rate::legacy_rate_mbps(raw));
        }

        if let (Some(mac_usecs), Some(rate_mbps)) = (frame.mac_usecs, frame.rate) {
            frame.airtime_usec =
                Some(rate::airtime_usec(frame.orig_len, rate_mbps, mac_usecs, self.last_mac_usecs));
        }

        let dot11 = dot11::parse(body);
        frame.frame_type = Some(dot11.fulltype);
        frame.typestr = dot11.typestr;
        frame.dsmode = Some(dot11.dsmode);
        frame.retry = dot11.retry;
        frame.powerman = dot11.powerman;
        frame.order = dot11.order;
        frame.duration = Some(dot11.duration);
        frame.ra = dot11.ra;
        frame.ta = dot11.ta;
        frame.xa = dot11.xa;
        frame.seq = dot11.seq;
        frame.frag = dot11.frag;
        frame.ssid = dot11.ssid;

        self.apply_ta_inheritance(&mut frame);
        if let Some(mac_usecs) = frame.mac_usecs {
            self.last_mac_usecs = Some(mac_usecs);
        }

        frame
    }

    /// CTS/ACK frames omit TA for efficiency; fill it in from the
    /// previous frame's RA when it's safe to assume they refer to the
    /// same exchange.
    fn apply_ta_inheritance(&mut self, frame: &mut Frame) {
        if frame.ta.is_none() {
            if let (Some(last_ta), Some(last_ra), Some(ra)) = (self.last_ta, self.last_ra, frame.ra)
            {
                if last_ta == ra && last_ra != ra {
                    frame.ta = Some(last_ra);
                }
            }
            self.last_ta = None;
            self.last_ra = None;
        } else {
            self.last_ta = frame.ta;
            self.last_ra = frame.ra;
        }
    }
}

/// Pull interface: a lazy, finite `Iterator` of frame records read from
/// `R`. Detects and transparently inflates gzip-wrapped input.
pub struct FrameReader {
    assembler: FrameAssembler,
    source: Box<dyn Read>,
    finished: bool,
}

impl FrameReader {
    pub fn new<R: Read + 'static>(source: R) -> std::io::Result<Self> {
        Ok(FrameReader {
            assembler: FrameAssembler::new(),
            source: sniff_gzip(source)?,
            finished: false,
        })
    }
}

impl Iterator for FrameReader {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.assembler.try_next() {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {
                    let mut chunk = [0u8; 64 * 1024];
                    match self.source.read(&mut chunk) {
                        Ok(0) => {
                            self.finished = true;
                            return None;
                        }
                        Ok(n) => self.assembler.feed(&chunk[..n]),
                        Err(e) => {
                            self.finished = true;
                            return Some(Err(Error::Io(e)));
                        }
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Push interface: append bytes as they arrive and synchronously invoke
/// `callback` once per fully decoded frame. No gzip handling here —
/// callers are expected to hand over already-decompressed bytes, exactly
/// as `wifipacket.py`'s `Packetizer.Handle` does.
pub struct Packetizer<F: FnMut(Frame)> {
    assembler: FrameAssembler,
    callback: F,
}

impl<F: FnMut(Frame)> Packetizer<F> {
    pub fn new(callback: F) -> Self {
        Packetizer { assembler: FrameAssembler::new(), callback }
    }

    /// Returns `Err` only for a fatal `FileError`; per-record problems
    /// are logged and swallowed inside the assembler.
    pub fn handle(&mut self, bytes: &[u8]) -> Result<()> {
        self.assembler.feed(bytes);
        loop {
            match self.assembler.try_next()? {
                Some(frame) => (self.callback)(frame),
                None => return Ok(()),
            }
        }
    }
}
