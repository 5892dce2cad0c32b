///! Access point observations consumed by provider matching
use serde::{Deserialize, Serialize};

/// Hotspot 2.0 release advertised in the AP's vendor-specific element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HsRelease {
    R1,
    R2,
}

/// One access point as seen in a scan, with the information elements that
/// matter for Passpoint matching already extracted.
///
/// The BSSID is kept in its textual form here; it is parsed into a
/// [`MacAddress`](crate::mac::MacAddress) when matching runs, and a malformed
/// value yields an empty match list rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ssid: String,
    pub bssid: String,
    /// Homogeneous ESS identifier, zero when the AP does not advertise one.
    pub hessid: u64,
    /// ANQP domain id from the HS2.0 vendor-specific element, zero if absent.
    pub anqp_domain_id: u16,
    /// Organization identifiers from the roaming consortium element.
    pub roaming_consortium_ois: Vec<u64>,
    pub hs_release: HsRelease,
    /// Whether the AP advertises Passpoint (interworking) support at all.
    pub is_passpoint: bool,
}

impl ScanResult {
    /// Convenience constructor for an AP with no roaming consortium data.
    pub fn new(ssid: impl Into<String>, bssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
            hessid: 0,
            anqp_domain_id: 0,
            roaming_consortium_ois: Vec::new(),
            hs_release: HsRelease::R1,
            is_passpoint: true,
        }
    }
}
