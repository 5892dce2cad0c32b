///! Outstanding ANQP request tracking
use super::cache::AnqpNetworkKey;
use crate::mac::MacAddress;
use std::collections::HashMap;
use std::sync::Arc;

/// Interface to the layer that performs the actual GAS/ANQP exchanges over
/// the air. Implemented outside this crate; both calls report whether the
/// request could be issued.
pub trait AnqpRequester: Send + Sync {
    /// Issue an ANQP query to `bssid`. The flags tell the protocol layer to
    /// also ask for the roaming consortium OI list and the HS 2.0 R2 element
    /// set respectively.
    fn request_anqp(&self, bssid: MacAddress, request_rc_ois: bool, request_hs_r2: bool) -> bool;

    /// Request an icon file from `bssid`.
    fn request_icon(&self, bssid: MacAddress, file_name: &str) -> bool;
}

/// A request that has been issued and is awaiting its response.
#[derive(Debug, Clone)]
pub struct PendingAnqpRequest {
    pub key: AnqpNetworkKey,
    pub requested_rc_ois: bool,
    pub requested_hs_r2: bool,
}

/// Tracks at most one outstanding ANQP request per BSSID.
///
/// APs re-broadcast continuously, so every scan cycle retries the same cache
/// misses; without this gate each miss would put another query on the air.
/// One exchange answers everything pending for a BSSID, so duplicates are
/// dropped rather than queued.
pub struct AnqpRequestManager {
    requester: Arc<dyn AnqpRequester>,
    pending: HashMap<u64, PendingAnqpRequest>,
}

impl AnqpRequestManager {
    pub fn new(requester: Arc<dyn AnqpRequester>) -> Self {
        Self {
            requester,
            pending: HashMap::new(),
        }
    }

    /// Issue an ANQP query for `bssid` unless one is already in flight.
    /// Returns whether a new request was issued.
    pub fn request_anqp_elements(
        &mut self,
        bssid: MacAddress,
        key: &AnqpNetworkKey,
        request_rc_ois: bool,
        request_hs_r2: bool,
    ) -> bool {
        if self.pending.contains_key(&bssid.raw()) {
            tracing::debug!("ANQP request already in flight for {}, dropping", bssid);
            return false;
        }

        if !self.requester.request_anqp(bssid, request_rc_ois, request_hs_r2) {
            tracing::warn!("Failed to issue ANQP request to {}", bssid);
            return false;
        }

        self.pending.insert(
            bssid.raw(),
            PendingAnqpRequest {
                key: key.clone(),
                requested_rc_ois: request_rc_ois,
                requested_hs_r2: request_hs_r2,
            },
        );
        true
    }

    /// Resolve the pending request for `bssid`, returning its cache key.
    ///
    /// `None` means the response is not attributable to a request we issued;
    /// callers ignore those. `success` only matters downstream (whether the
    /// cache gets populated), the bookkeeping is identical either way.
    pub fn on_request_completed(
        &mut self,
        bssid: MacAddress,
        success: bool,
    ) -> Option<AnqpNetworkKey> {
        let pending = self.pending.remove(&bssid.raw())?;
        tracing::debug!("ANQP request for {} completed, success={}", bssid, success);
        Some(pending.key)
    }

    /// Forget the pending request for `bssid` without resolving it.
    pub fn clear_pending(&mut self, bssid: MacAddress) {
        self.pending.remove(&bssid.raw());
    }

    /// Pass-through to the requester; icon requests are not deduplicated.
    pub fn request_icon(&self, bssid: MacAddress, file_name: &str) -> bool {
        self.requester.request_icon(bssid, file_name)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRequester {
        accept: AtomicBool,
        anqp_calls: Mutex<Vec<(MacAddress, bool, bool)>>,
        icon_calls: Mutex<Vec<(MacAddress, String)>>,
    }

    impl RecordingRequester {
        fn accepting() -> Self {
            let requester = Self::default();
            requester.accept.store(true, Ordering::SeqCst);
            requester
        }
    }

    impl AnqpRequester for RecordingRequester {
        fn request_anqp(
            &self,
            bssid: MacAddress,
            request_rc_ois: bool,
            request_hs_r2: bool,
        ) -> bool {
            self.anqp_calls
                .lock()
                .unwrap()
                .push((bssid, request_rc_ois, request_hs_r2));
            self.accept.load(Ordering::SeqCst)
        }

        fn request_icon(&self, bssid: MacAddress, file_name: &str) -> bool {
            self.icon_calls
                .lock()
                .unwrap()
                .push((bssid, file_name.to_string()));
            self.accept.load(Ordering::SeqCst)
        }
    }

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    fn key_for(bssid: MacAddress) -> AnqpNetworkKey {
        AnqpNetworkKey::build("cafe", bssid, 0, 0)
    }

    #[test]
    fn test_request_is_issued_and_tracked() {
        let requester = Arc::new(RecordingRequester::accepting());
        let mut tracker = AnqpRequestManager::new(requester.clone());

        let bssid = mac("02:00:00:00:00:01");
        assert!(tracker.request_anqp_elements(bssid, &key_for(bssid), true, false));
        assert_eq!(tracker.pending_count(), 1);
        assert_eq!(
            requester.anqp_calls.lock().unwrap().as_slice(),
            &[(bssid, true, false)]
        );
    }

    #[test]
    fn test_duplicate_request_is_dropped() {
        let requester = Arc::new(RecordingRequester::accepting());
        let mut tracker = AnqpRequestManager::new(requester.clone());

        let bssid = mac("02:00:00:00:00:01");
        assert!(tracker.request_anqp_elements(bssid, &key_for(bssid), false, false));
        assert!(!tracker.request_anqp_elements(bssid, &key_for(bssid), false, false));
        // The requester saw exactly one call.
        assert_eq!(requester.anqp_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_issue_failure_leaves_nothing_pending() {
        let requester = Arc::new(RecordingRequester::default());
        let mut tracker = AnqpRequestManager::new(requester);

        let bssid = mac("02:00:00:00:00:01");
        assert!(!tracker.request_anqp_elements(bssid, &key_for(bssid), false, true));
        assert_eq!(tracker.pending_count(), 0);
        // A retry is allowed immediately.
        assert!(tracker.on_request_completed(bssid, true).is_none());
    }

    #[test]
    fn test_completion_returns_originating_key() {
        let requester = Arc::new(RecordingRequester::accepting());
        let mut tracker = AnqpRequestManager::new(requester);

        let bssid = mac("02:00:00:00:00:01");
        let key = key_for(bssid);
        tracker.request_anqp_elements(bssid, &key, false, false);

        assert_eq!(tracker.on_request_completed(bssid, true), Some(key));
        assert_eq!(tracker.pending_count(), 0);
        // Second completion for the same BSSID is unattributable.
        assert_eq!(tracker.on_request_completed(bssid, true), None);
    }

    #[test]
    fn test_failed_completion_still_clears_pending() {
        let requester = Arc::new(RecordingRequester::accepting());
        let mut tracker = AnqpRequestManager::new(requester);

        let bssid = mac("02:00:00:00:00:01");
        tracker.request_anqp_elements(bssid, &key_for(bssid), false, false);
        assert!(tracker.on_request_completed(bssid, false).is_some());
        // The slot is free again after a failure.
        assert!(tracker.request_anqp_elements(bssid, &key_for(bssid), false, false));
    }

    #[test]
    fn test_clear_pending_frees_the_slot() {
        let requester = Arc::new(RecordingRequester::accepting());
        let mut tracker = AnqpRequestManager::new(requester);

        let bssid = mac("02:00:00:00:00:01");
        tracker.request_anqp_elements(bssid, &key_for(bssid), false, false);
        tracker.clear_pending(bssid);
        assert_eq!(tracker.pending_count(), 0);
        assert!(tracker.request_anqp_elements(bssid, &key_for(bssid), false, false));
    }

    #[test]
    fn test_icon_requests_pass_through() {
        let requester = Arc::new(RecordingRequester::accepting());
        let tracker = AnqpRequestManager::new(requester.clone());

        let bssid = mac("02:00:00:00:00:01");
        assert!(tracker.request_icon(bssid, "logo.png"));
        assert_eq!(
            requester.icon_calls.lock().unwrap().as_slice(),
            &[(bssid, "logo.png".to_string())]
        );
    }
}
