use std::fmt;

/// A 48-bit 802.11 station address, formatted `"aa:bb:cc:dd:ee:ff"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn from_slice(b: &[u8]) -> Self {
        let mut addr = [0u8; 6];
        addr.copy_from_slice(&b[..6]);
        MacAddr(addr)
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_original_macaddr_helper() {
        let mac = MacAddr::from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(mac.to_string(), "00:11:22:33:44:55");
    }

    #[test]
    fn multicast_bit_is_the_low_bit_of_the_first_octet() {
        assert!(MacAddr::from_slice(&[0x01, 0, 0, 0, 0, 0xfb]).is_multicast());
        assert!(!MacAddr::from_slice(&[0x00, 0x0b, 0x85, 0x71, 0x20, 0xce]).is_multicast());
    }
}
