///! Hotspot 2.0 (Passpoint) service-provider core: ANQP metadata cache,
///! request deduplication, provider registry and the home/roaming matching
///! engine, driven by a single event loop.
pub mod clock;
pub mod config;
pub mod logging;
pub mod mac;
pub mod module;
pub mod scan;

pub use clock::{Clock, SystemClock};
pub use config::PasspointConfig;
pub use mac::{MacAddress, ParseMacError};
pub use module::anqp::{
    element_map, AnqpCache, AnqpData, AnqpElement, AnqpElementType, AnqpElements, AnqpNetworkKey,
    AnqpRequestManager, AnqpRequester, OsuMethod, OsuProvider, OsuProviderInfo,
    ANQP_DATA_LIFETIME_MILLIS,
};
pub use module::events::{
    event_channel, run_event_loop, start_cache_sweep_task, PasspointEvent, WnmNotice,
};
pub use module::manager::{
    CertificateVerifier, NetworkConfigStore, NoticeBroadcaster, PasspointManager,
    PasspointMetrics, ProviderKeyStore,
};
pub use module::matching::{
    matching_osu_providers, matching_profiles_for_osu_providers, MatchList, MatchingEngine,
    PasspointMatch, ProviderMatcher,
};
pub use module::provider::{
    PasspointProfile, PasspointProvider, ProfileError, ProviderId, ProviderRegistry,
};
pub use scan::{HsRelease, ScanResult};
