//! Radiotap present-bitmap chain and known-field extraction.
//!
//! Layout: `version u8 | pad u8 | it_len u16 | present u32 (+ chained words
//! while the top bit is set) | fields...`. Everything is little-endian.
//! Only the first present word drives field parsing; later words in the
//! chain are skipped (but still advance the cursor past them). Capture
//! tools in the wild rarely populate a second present word with fields
//! this decoder cares about, so there's no value in threading extension
//! fields through the rest of the pipeline.

use crate::error::PacketError;
use byteorder::{ByteOrder, LittleEndian};

/// One row per known present-bit, in bit order: `(align, size)` of the
/// field as packed in the radiotap body. Mirrors `wifipacket.py`'s
/// `RADIOTAP_FIELDS` (struct format -> byte layout).
const FIELD_LAYOUT: [(usize, usize); 22] = [
    (8, 8), // 0  mac_usecs: u64
    (1, 1), // 1  flags: u8
    (1, 1), // 2  rate: u8
    (2, 4), // 3  channel: u16,u16
    (1, 2), // 4  fhss: u8,u8
    (1, 1), // 5  dbm_antsignal: i8
    (1, 1), // 6  dbm_antnoise: i8
    (2, 2), // 7  lock_quality: u16
    (2, 2), // 8  tx_attenuation: u16
    (1, 1), // 9  db_tx_attenuation: u8
    (1, 1), // 10 dbm_tx_power: i8
    (1, 1), // 11 antenna: u8
    (1, 1), // 12 db_antsignal: u8
    (1, 1), // 13 db_antnoise: u8
    (2, 2), // 14 rx_flags: u16
    (2, 2), // 15 tx_flags: u16
    (1, 1), // 16 rts_retries: u8
    (1, 1), // 17 data_retries: u8
    (4, 8), // 18 channelplus: u32,u32
    (1, 3), // 19 ht: u8,u8,u8
    (4, 8), // 20 ampdu_status: u32,u16,u8,u8
    (2, 12), // 21 vht: u16,u8,u8,4*u8,u8,u8,u16
];

fn align(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) & !(alignment - 1)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtFields {
    pub known: u8,
    pub flags: u8,
    pub index: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VhtFields {
    pub known: u16,
    pub flags: u8,
    pub bw: u8,
    pub mcs_nss: [u8; 4],
}

/// The subset of radiotap fields this decoder cares about, plus the
/// byte offset at which the 802.11 frame itself begins.
#[derive(Debug, Clone, Default)]
pub struct RadiotapFields {
    pub mac_usecs: Option<u64>,
    pub flags: Option<u8>,
    pub rate_raw: Option<u8>,
    pub freq: Option<u16>,
    pub channel_flags: Option<u16>,
    pub dbm_antsignal: Option<i8>,
    pub dbm_antnoise: Option<i8>,
    pub antenna: Option<u8>,
    pub ht: Option<HtFields>,
    pub vht: Option<VhtFields>,
}

/// Parse the radiotap header in `data`. Returns the parsed fields and the
/// slice of `data` that follows the radiotap header (the 802.11 frame).
///
/// `data` must be the whole pcap record body; this does not consume from
/// a `ByteBuffer` because by this point `PcapFraming` has already pulled
/// the full `incl_len` bytes out for us.
pub fn parse(data: &[u8]) -> Result<(RadiotapFields, &[u8]), PacketError> {
    if data.len() < 8 {
        return Err(PacketError::UnknownRadiotapVersion(0xFF));
    }
    let version = data[0];
    if version != 0 {
        return Err(PacketError::UnknownRadiotapVersion(version));
    }
    let it_len = LittleEndian::read_u16(&data[2..4]) as usize;
    let present = LittleEndian::read_u32(&data[4..8]);
    let mut chain_word = present;
    let mut offset = 8;
    while chain_word & (1 << 31) != 0 && offset + 4 <= data.len() && offset + 4 <= it_len {
        chain_word = LittleEndian::read_u32(&data[offset..offset + 4]);
        offset += 4;
    }

    let it_len = it_len.min(data.len());
    let opt_bytes = if offset <= it_len { &data[offset..it_len] } else { &[] };
    let frame = if it_len <= data.len() { &data[it_len..] } else { &[] };

    let mut fields = RadiotapFields::default();
    let mut ofs = 0usize;
    for (bit, (field_align, size)) in FIELD_LAYOUT.iter().enumerate() {
        if present & (1 << bit) == 0 {
            continue;
        }
        ofs = align(ofs, *field_align);
        if ofs + size > opt_bytes.len() {
            break;
        }
        let v = &opt_bytes[ofs..ofs + size];
        match bit {
            0 => fields.mac_usecs = Some(LittleEndian::read_u64(v)),
            1 => fields.flags = Some(v[0]),
            2 => fields.rate_raw = Some(v[0]),
            3 => {
                fields.freq = Some(LittleEndian::read_u16(&v[0..2]));
                fields.channel_flags = Some(LittleEndian::read_u16(&v[2..4]));
            }
            5 => fields.dbm_antsignal = Some(v[0] as i8),
            6 => fields.dbm_antnoise = Some(v[0] as i8),
            11 => fields.antenna = Some(v[0]),
            19 => {
                fields.ht = Some(HtFields { known: v[0], flags: v[1], index: v[2] });
            }
            21 => {
                let mut mcs_nss = [0u8; 4];
                mcs_nss.copy_from_slice(&v[4..8]);
                fields.vht = Some(VhtFields {
                    known: LittleEndian::read_u16(&v[0..2]),
                    flags: v[2],
                    bw: v[3],
                    mcs_nss,
                });
            }
            _ => {}
        }
        ofs += size;
    }

    Ok((fields, frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(present: u32, fields: &[u8]) -> Vec<u8> {
        let it_len = 8 + fields.len();
        let mut v = vec![0u8, 0u8];
        v.extend_from_slice(&(it_len as u16).to_le_bytes());
        v.extend_from_slice(&present.to_le_bytes());
        v.extend_from_slice(fields);
        v
    }

    #[test]
    fn rejects_nonzero_version() {
        let mut data = header(0, &[]);
        data[0] = 1;
        assert!(parse(&data).is_err());
    }

    #[test]
    fn mac_usecs_and_rate_and_channel() {
        // present bits 0 (mac_usecs,u64), 2 (rate,u8), 3 (channel, u16+u16)
        let present = (1 << 0) | (1 << 2) | (1 << 3);
        let mut fields = Vec::new();
        fields.extend_from_slice(&1234u64.to_le_bytes()); // mac_usecs, already 8-aligned
        fields.push(0x18); // rate -> 12.0 Mb/s
        fields.push(0); // pad to align channel (u16) to 2
        fields.extend_from_slice(&2412u16.to_le_bytes());
        fields.extend_from_slice(&0u16.to_le_bytes());
        let data = header(present, &fields);
        let (rt, frame) = parse(&data).unwrap();
        assert_eq!(rt.mac_usecs, Some(1234));
        assert_eq!(rt.rate_raw, Some(0x18));
        assert_eq!(rt.freq, Some(2412));
        assert!(frame.is_empty());
    }

    #[test]
    fn extension_chain_is_skipped_but_cursor_advances_past_it() {
        // first word has the top bit set (continuation) plus bit 1 (flags)
        let present0 = (1u32 << 31) | (1 << 1);
        let present1 = 0u32; // second word, irrelevant, top bit clear
        let mut data = vec![0u8, 0u8];
        let it_len = 8 + 4 + 1; // header + extra present word + flags byte
        data.extend_from_slice(&(it_len as u16).to_le_bytes());
        data.extend_from_slice(&present0.to_le_bytes());
        data.extend_from_slice(&present1.to_le_bytes());
        data.push(0x40); // flags = BAD_FCS
        let (rt, _frame) = parse(&data).unwrap();
        assert_eq!(rt.flags, Some(0x40));
    }
}
