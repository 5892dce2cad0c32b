///! ANQP metadata handling
///!
///! Provider matching needs data that is not in the beacon; it is fetched
///! from the AP via ANQP queries. This module owns that data once fetched:
///! the element model, the cache with fixed-lifetime expiry, and the tracker
///! that keeps at most one query in flight per BSSID.

// ============ Element Model ============
mod elements;
pub use elements::{
    element_map, AnqpElement, AnqpElementType, AnqpElements, OsuMethod, OsuProvider,
    OsuProviderInfo,
};

// ============ Cache ============
mod cache;
pub use cache::{AnqpCache, AnqpData, AnqpNetworkKey, ANQP_DATA_LIFETIME_MILLIS};

// ============ Request Tracking ============
mod tracker;
pub use tracker::{AnqpRequestManager, AnqpRequester, PendingAnqpRequest};
