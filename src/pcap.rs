//! pcap container framing: magic/endianness detection, global header,
//! per-record header and body extraction. Grounded on `wifipacket.py`'s
//! `PacketizeBuf` (the magic/header/record-header reads and their
//! validation) — gzip detection lives one layer up, at the `Read`
//! source (see `crate::stream`), matching the original's `Packetize`
//! vs. `PacketizeBuf` split.

use crate::buffer::ByteBuffer;
use crate::error::FileError;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub const TCPDUMP_MAGIC: u32 = 0xa1b2_c3d4;
const TCPDUMP_VERSION: (u16, u16) = (2, 4);
const LINKTYPE_IEEE802_11_RADIOTAP: u32 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, Clone, Copy)]
pub struct GlobalHeader {
    pub endianness: Endianness,
    pub snaplen: u32,
}

#[derive(Debug, Clone)]
pub struct RawRecord {
    pub pcap_secs: f64,
    pub incl_len: u32,
    pub orig_len: u32,
    pub body: bytes::Bytes,
}

fn read_u16(endianness: Endianness, b: &[u8]) -> u16 {
    match endianness {
        Endianness::Big => BigEndian::read_u16(b),
        Endianness::Little => LittleEndian::read_u16(b),
    }
}

fn read_u32(endianness: Endianness, b: &[u8]) -> u32 {
    match endianness {
        Endianness::Big => BigEndian::read_u32(b),
        Endianness::Little => LittleEndian::read_u32(b),
    }
}

/// Try to parse the 24-byte global header off the front of `buf`.
/// `Ok(None)` means not enough bytes buffered yet (NeedsMore).
pub fn try_parse_global_header(buf: &mut ByteBuffer) -> Result<Option<GlobalHeader>, FileError> {
    let peeked = match buf.peek(24) {
        Some(b) => b,
        None => return Ok(None),
    };

    let endianness = if LittleEndian::read_u32(&peeked[0..4]) == TCPDUMP_MAGIC {
        Endianness::Little
    } else if BigEndian::read_u32(&peeked[0..4]) == TCPDUMP_MAGIC {
        Endianness::Big
    } else {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&peeked[0..4]);
        return Err(FileError::UnexpectedMagic(magic));
    };

    let version_major = read_u16(endianness, &peeked[4..6]);
    let version_minor = read_u16(endianness, &peeked[6..8]);
    // thiszone (i32) and sigfigs (u32) at [8..12], [12..16] are not used.
    let snaplen = read_u32(endianness, &peeked[16..20]);
    let network = read_u32(endianness, &peeked[20..24]);

    if (version_major, version_minor) != TCPDUMP_VERSION {
        return Err(FileError::UnexpectedVersion(version_major, version_minor));
    }
    if network != LINKTYPE_IEEE802_11_RADIOTAP {
        return Err(FileError::UnexpectedNetwork(network));
    }

    buf.get(24).expect("just peeked 24 bytes");
    Ok(Some(GlobalHeader { endianness, snaplen }))
}

/// Try to parse one pcap record (16-byte header + `incl_len` body bytes)
/// off the front of `buf`. `Ok(None)` means not enough bytes buffered yet.
pub fn try_parse_record(
    buf: &mut ByteBuffer,
    header: &GlobalHeader,
) -> Result<Option<RawRecord>, FileError> {
    let peeked_header = match buf.peek(16) {
        Some(b) => b,
        None => return Ok(None),
    };
    let ts_sec = read_u32(header.endianness, &peeked_header[0..4]);
    let ts_usec = read_u32(header.endianness, &peeked_header[4..8]);
    let incl_len = read_u32(header.endianness, &peeked_header[8..12]);
    let orig_len = read_u32(header.endianness, &peeked_header[12..16]);

    if incl_len > orig_len {
        return Err(FileError::InclLenExceedsOrigLen { incl_len, orig_len });
    }
    if incl_len > header.snaplen {
        return Err(FileError::InclLenExceedsSnaplen { incl_len, snaplen: header.snaplen });
    }

    if buf.peek(16 + incl_len as usize).is_none() {
        return Ok(None);
    }
    buf.get(16).expect("just peeked 16 bytes");
    let body = buf.get(incl_len as usize).expect("just peeked incl_len bytes");

    Ok(Some(RawRecord {
        pcap_secs: ts_sec as f64 + (ts_usec as f64 / 1e6),
        incl_len,
        orig_len,
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_header_bytes(little: bool, snaplen: u32) -> Vec<u8> {
        let mut v = Vec::new();
        if little {
            v.extend_from_slice(&TCPDUMP_MAGIC.to_le_bytes());
            v.extend_from_slice(&2u16.to_le_bytes());
            v.extend_from_slice(&4u16.to_le_bytes());
            v.extend_from_slice(&0i32.to_le_bytes());
            v.extend_from_slice(&0u32.to_le_bytes());
            v.extend_from_slice(&snaplen.to_le_bytes());
            v.extend_from_slice(&127u32.to_le_bytes());
        } else {
            v.extend_from_slice(&TCPDUMP_MAGIC.to_be_bytes());
            v.extend_from_slice(&2u16.to_be_bytes());
            v.extend_from_slice(&4u16.to_be_bytes());
            v.extend_from_slice(&0i32.to_be_bytes());
            v.extend_from_slice(&0u32.to_be_bytes());
            v.extend_from_slice(&snaplen.to_be_bytes());
            v.extend_from_slice(&127u32.to_be_bytes());
        }
        v
    }

    #[test]
    fn needs_more_before_24_bytes() {
        let mut buf = ByteBuffer::new();
        buf.put(&b"short"[..]);
        assert!(try_parse_global_header(&mut buf).unwrap().is_none());
    }

    #[test]
    fn parses_both_endiannesses() {
        for little in [true, false] {
            let mut buf = ByteBuffer::new();
            buf.put(global_header_bytes(little, 65535));
            let hdr = try_parse_global_header(&mut buf).unwrap().unwrap();
            assert_eq!(hdr.snaplen, 65535);
            assert_eq!(hdr.endianness == Endianness::Little, little);
            assert_eq!(buf.len(), 0);
        }
    }

    #[test]
    fn bad_magic_is_a_file_error() {
        let mut buf = ByteBuffer::new();
        buf.put(vec![0u8; 24]);
        assert!(try_parse_global_header(&mut buf).is_err());
    }

    #[test]
    fn record_incl_len_exceeding_orig_len_is_fatal() {
        let header = GlobalHeader { endianness: Endianness::Little, snaplen: 65535 };
        let mut buf = ByteBuffer::new();
        let mut rec = Vec::new();
        rec.extend_from_slice(&0u32.to_le_bytes());
        rec.extend_from_slice(&0u32.to_le_bytes());
        rec.extend_from_slice(&10u32.to_le_bytes()); // incl_len
        rec.extend_from_slice(&5u32.to_le_bytes()); // orig_len < incl_len
        buf.put(rec);
        assert!(try_parse_record(&mut buf, &header).is_err());
    }

    #[test]
    fn partial_body_is_needs_more_not_an_error() {
        let header = GlobalHeader { endianness: Endianness::Little, snaplen: 65535 };
        let mut buf = ByteBuffer::new();
        let mut rec = Vec::new();
        rec.extend_from_slice(&0u32.to_le_bytes());
        rec.extend_from_slice(&0u32.to_le_bytes());
        rec.extend_from_slice(&10u32.to_le_bytes());
        rec.extend_from_slice(&10u32.to_le_bytes());
        rec.extend_from_slice(&[0u8; 3]); // only 3 of 10 body bytes
        buf.put(rec);
        assert!(try_parse_record(&mut buf, &header).unwrap().is_none());
    }
}
