//! Gzip auto-detection for the pull entry point. Grounded on
//! `wifipacket.py`'s `Packetize`, which peeks the first few bytes of the
//! stream, and either replays them in front of a `GzipFile` or replays
//! them in front of the plain stream. We don't require `Seek`: instead
//! of seeking back, the sniffed bytes are replayed via `Read::chain`,
//! which works on any reader.

use flate2::read::GzDecoder;
use std::io::{self, Cursor, Read};

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Sniff the first bytes of `source` for the gzip magic and, if present,
/// wrap the stream in a transparent inflator. Either way, the bytes
/// already read to sniff are replayed in front of the rest of the stream.
pub fn sniff_gzip<R: Read + 'static>(mut source: R) -> io::Result<Box<dyn Read>> {
    let mut sniffed = [0u8; 4];
    let mut n = 0;
    while n < sniffed.len() {
        let read = source.read(&mut sniffed[n..])?;
        if read == 0 {
            break;
        }
        n += read;
    }
    let prefix = Cursor::new(sniffed[..n].to_vec());
    if n >= 3 && sniffed[..3] == GZIP_MAGIC {
        Ok(Box::new(GzDecoder::new(prefix.chain(source))))
    } else {
        Ok(Box::new(prefix.chain(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    #[test]
    fn plain_pcap_bytes_pass_through_unchanged() {
        let data = b"abcdefgh".to_vec();
        let mut r = sniff_gzip(IoCursor::new(data.clone())).unwrap();
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn short_input_does_not_panic() {
        let data = b"ab".to_vec();
        let mut r = sniff_gzip(IoCursor::new(data.clone())).unwrap();
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }
}
