///! ANQP element cache with fixed-lifetime expiry
use super::elements::AnqpElements;
use crate::clock::Clock;
use crate::mac::MacAddress;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How long a fetched element set stays usable.
pub const ANQP_DATA_LIFETIME_MILLIS: i64 = 60 * 60 * 1000;

/// Cache key derived from the identifiers an AP advertises.
///
/// APs with a non-zero ANQP domain id serve identical ANQP data across the
/// operator domain, so the BSSID is left out of the key for them and the
/// HESSID is preferred over the SSID when present. APs without a domain id
/// get a per-BSSID entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnqpNetworkKey {
    ssid: Option<String>,
    bssid: u64,
    hessid: u64,
    anqp_domain_id: u16,
}

impl AnqpNetworkKey {
    pub fn build(ssid: &str, bssid: MacAddress, hessid: u64, anqp_domain_id: u16) -> Self {
        if anqp_domain_id == 0 {
            Self {
                ssid: Some(ssid.to_string()),
                bssid: bssid.raw(),
                hessid: 0,
                anqp_domain_id: 0,
            }
        } else if hessid != 0 {
            Self {
                ssid: None,
                bssid: 0,
                hessid,
                anqp_domain_id,
            }
        } else {
            Self {
                ssid: Some(ssid.to_string()),
                bssid: 0,
                hessid: 0,
                anqp_domain_id,
            }
        }
    }
}

impl fmt::Display for AnqpNetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{:x}:{}",
            self.ssid.as_deref().unwrap_or("<none>"),
            MacAddress::new(self.bssid),
            self.hessid,
            self.anqp_domain_id
        )
    }
}

/// One cached element set with its creation time.
#[derive(Debug, Clone)]
pub struct AnqpData {
    elements: AnqpElements,
    created_at_millis: i64,
}

impl AnqpData {
    fn new(elements: AnqpElements, created_at_millis: i64) -> Self {
        Self {
            elements,
            created_at_millis,
        }
    }

    pub fn elements(&self) -> &AnqpElements {
        &self.elements
    }

    pub fn expired(&self, at_millis: i64) -> bool {
        at_millis >= self.created_at_millis + ANQP_DATA_LIFETIME_MILLIS
    }
}

/// Cache of fetched ANQP element sets.
///
/// `get_entry` never returns stale data; physical eviction happens in
/// `sweep`, which an external scheduler invokes periodically.
pub struct AnqpCache {
    entries: HashMap<AnqpNetworkKey, AnqpData>,
    clock: Arc<dyn Clock>,
}

impl AnqpCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Store the element set for `key`, replacing any previous entry whole.
    pub fn add_entry(&mut self, key: AnqpNetworkKey, elements: AnqpElements) {
        let data = AnqpData::new(elements, self.clock.now_millis());
        tracing::debug!("Caching ANQP entry for {}", key);
        self.entries.insert(key, data);
    }

    /// Look up the entry for `key`, treating an expired entry as absent.
    pub fn get_entry(&self, key: &AnqpNetworkKey) -> Option<&AnqpData> {
        let now = self.clock.now_millis();
        self.entries.get(key).filter(|data| !data.expired(now))
    }

    /// Evict every entry past its lifetime.
    pub fn sweep(&mut self) {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, data| !data.expired(now));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!("Swept {} expired ANQP cache entries", evicted);
        }
    }

    /// Drop everything, expired or not.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::module::anqp::elements::{element_map, AnqpElement};

    fn domain_elements(domain: &str) -> AnqpElements {
        element_map([AnqpElement::DomainName(vec![domain.to_string()])])
    }

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_key_is_per_bssid_without_domain_id() {
        let a = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0, 0);
        let b = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:02"), 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_shared_across_bssids_with_domain_id() {
        let a = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0x1234, 7);
        let b = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:02"), 0x1234, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_falls_back_to_ssid_without_hessid() {
        let a = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0, 7);
        let b = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:02"), 0, 7);
        let other_ssid = AnqpNetworkKey::build("bar", mac("02:00:00:00:00:01"), 0, 7);
        assert_eq!(a, b);
        assert_ne!(a, other_ssid);
    }

    #[test]
    fn test_entry_visible_through_shared_key() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = AnqpCache::new(clock);

        let seen_at_first_ap = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0x99, 3);
        cache.add_entry(seen_at_first_ap, domain_elements("example.com"));

        let seen_at_second_ap = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:02"), 0x99, 3);
        assert!(cache.get_entry(&seen_at_second_ap).is_some());
    }

    #[test]
    fn test_expired_entry_is_never_returned() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = AnqpCache::new(clock.clone());

        let key = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0, 0);
        cache.add_entry(key.clone(), domain_elements("example.com"));

        clock.advance(ANQP_DATA_LIFETIME_MILLIS - 1);
        assert!(cache.get_entry(&key).is_some());

        clock.advance(1);
        assert!(cache.get_entry(&key).is_none());
        // Still physically present until swept.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_evicts_only_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = AnqpCache::new(clock.clone());

        let old_key = AnqpNetworkKey::build("old", mac("02:00:00:00:00:01"), 0, 0);
        cache.add_entry(old_key.clone(), domain_elements("old.example.com"));

        clock.advance(ANQP_DATA_LIFETIME_MILLIS / 2);
        let fresh_key = AnqpNetworkKey::build("fresh", mac("02:00:00:00:00:02"), 0, 0);
        cache.add_entry(fresh_key.clone(), domain_elements("fresh.example.com"));

        clock.advance(ANQP_DATA_LIFETIME_MILLIS / 2);
        cache.sweep();

        assert_eq!(cache.len(), 1);
        assert!(cache.get_entry(&old_key).is_none());
        assert!(cache.get_entry(&fresh_key).is_some());
    }

    #[test]
    fn test_add_entry_replaces_whole_value() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = AnqpCache::new(clock.clone());

        let key = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0, 0);
        cache.add_entry(key.clone(), domain_elements("first.example.com"));

        clock.advance(ANQP_DATA_LIFETIME_MILLIS - 1);
        cache.add_entry(key.clone(), domain_elements("second.example.com"));

        // Replacement refreshed the timestamp as well as the content.
        clock.advance(2);
        let entry = cache.get_entry(&key).unwrap();
        assert_eq!(
            entry.elements(),
            &domain_elements("second.example.com")
        );
    }

    #[test]
    fn test_flush_clears_everything() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = AnqpCache::new(clock);
        let key = AnqpNetworkKey::build("cafe", mac("02:00:00:00:00:01"), 0, 0);
        cache.add_entry(key, domain_elements("example.com"));
        cache.flush();
        assert!(cache.is_empty());
    }
}
