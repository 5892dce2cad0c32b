///! 48-bit MAC address handling for BSSIDs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a textual BSSID cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMacError {
    #[error("MAC address has {0} hex digits, expected 12")]
    InvalidLength(usize),
    #[error("MAC address contains non-hex digits: {0}")]
    InvalidDigits(String),
}

/// IEEE 802 MAC address, stored in the lower 48 bits of a `u64`.
///
/// Scan results carry the BSSID as text; everything downstream (cache keys,
/// request tracking, events) works on this canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(u64);

impl MacAddress {
    pub const ZERO: MacAddress = MacAddress(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw & 0xFFFF_FFFF_FFFF)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff` and bare 12-digit hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 {
            return Err(ParseMacError::InvalidLength(digits.len()));
        }

        let bytes =
            hex::decode(&digits).map_err(|_| ParseMacError::InvalidDigits(s.to_string()))?;
        let mut raw = 0u64;
        for byte in bytes {
            raw = (raw << 8) | byte as u64;
        }
        Ok(MacAddress(raw))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_separated() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.raw(), 0xAABB_CCDD_EEFF);
    }

    #[test]
    fn test_parse_bare_hex() {
        let mac: MacAddress = "0012abcdef01".parse().unwrap();
        assert_eq!(mac.raw(), 0x0012_ABCD_EF01);
    }

    #[test]
    fn test_parse_dash_separated() {
        let mac: MacAddress = "AA-BB-CC-00-11-22".parse().unwrap();
        assert_eq!(mac.raw(), 0xAABB_CC00_1122);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let err = "aa:bb:cc".parse::<MacAddress>().unwrap_err();
        assert_eq!(err, ParseMacError::InvalidLength(6));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let err = "zz:bb:cc:dd:ee:ff".parse::<MacAddress>().unwrap_err();
        assert!(matches!(err, ParseMacError::InvalidDigits(_)));
    }

    #[test]
    fn test_display_round_trip() {
        let mac: MacAddress = "02:00:5e:10:00:01".parse().unwrap();
        assert_eq!(mac.to_string(), "02:00:5e:10:00:01");
    }

    #[test]
    fn test_new_masks_to_48_bits() {
        let mac = MacAddress::new(0xFFFF_AABB_CCDD_EEFF);
        assert_eq!(mac.raw(), 0xAABB_CCDD_EEFF);
    }
}
