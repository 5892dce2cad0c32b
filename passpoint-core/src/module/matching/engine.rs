///! Provider matching against cached ANQP data
use crate::clock::Clock;
use crate::mac::MacAddress;
use crate::module::anqp::{AnqpCache, AnqpElements, AnqpNetworkKey, AnqpRequestManager};
use crate::module::provider::{PasspointProfile, PasspointProvider, ProviderRegistry};
use crate::scan::{HsRelease, ScanResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Classification of one provider against one AP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PasspointMatch {
    NoMatch,
    RoamingProvider,
    HomeProvider,
}

/// Credential and identity logic of a provider, implemented outside this
/// core (it needs EAP method and SIM knowledge this crate does not carry).
pub trait ProviderMatcher: Send + Sync {
    /// Classify `profile` against the ANQP element set of an AP. The OIs
    /// advertised in the AP's beacon are passed as an additional hint.
    fn match_provider(
        &self,
        profile: &PasspointProfile,
        elements: &AnqpElements,
        roaming_consortium_ois: &[u64],
    ) -> PasspointMatch;

    /// Refresh provider fields derived from external identity state (for
    /// example a SIM carrier id). Returns whether the provider changed and
    /// therefore needs to be persisted.
    fn try_refresh_identity(&self, provider: &mut PasspointProvider) -> bool {
        let _ = provider;
        false
    }
}

/// Result of one matching pass over the registry.
#[derive(Debug, Default)]
pub struct MatchList {
    pub matches: Vec<(PasspointProvider, PasspointMatch)>,
    /// Set when classification changed provider state; the caller owns
    /// persistence and must request a save.
    pub providers_updated: bool,
}

/// Matches scan observations against every registered provider.
///
/// Matching is cache-hit only: a miss issues a tracked ANQP request and
/// reports no matches, and the scan cycle after the response ingests will
/// see the data.
pub struct MatchingEngine {
    matcher: Arc<dyn ProviderMatcher>,
    clock: Arc<dyn Clock>,
}

impl MatchingEngine {
    pub fn new(matcher: Arc<dyn ProviderMatcher>, clock: Arc<dyn Clock>) -> Self {
        Self { matcher, clock }
    }

    /// Classify every provider against `scan`, in creation order.
    pub fn all_matched_providers(
        &self,
        scan: &ScanResult,
        cache: &AnqpCache,
        tracker: &mut AnqpRequestManager,
        registry: &mut ProviderRegistry,
    ) -> MatchList {
        let mut result = MatchList::default();

        let bssid: MacAddress = match scan.bssid.parse() {
            Ok(bssid) => bssid,
            Err(e) => {
                tracing::error!("Invalid BSSID in scan result '{}': {}", scan.bssid, e);
                return result;
            }
        };

        let key = AnqpNetworkKey::build(&scan.ssid, bssid, scan.hessid, scan.anqp_domain_id);
        let Some(entry) = cache.get_entry(&key) else {
            tracker.request_anqp_elements(
                bssid,
                &key,
                !scan.roaming_consortium_ois.is_empty(),
                scan.hs_release == HsRelease::R2,
            );
            tracing::debug!("ANQP entry not found for {}", key);
            return result;
        };

        for provider in registry.providers_mut() {
            if self.matcher.try_refresh_identity(provider) {
                result.providers_updated = true;
            }
            let status = self.matcher.match_provider(
                provider.profile(),
                entry.elements(),
                &scan.roaming_consortium_ois,
            );
            if status != PasspointMatch::NoMatch {
                result.matches.push((provider.clone(), status));
            }
        }
        result.matches.sort_by_key(|(p, _)| p.provider_id());

        for (provider, status) in &result.matches {
            tracing::debug!(
                "Matched {} to {} as {:?}",
                scan.ssid,
                provider.fqdn(),
                status
            );
        }
        result
    }

    /// Matching for network selection: expired subscriptions are dropped and
    /// home providers are preferred outright over roaming ones.
    ///
    /// A home subscription means no roaming charges and the operator's own
    /// terms, so when both kinds of credential work only home matches are
    /// returned.
    pub fn match_provider(
        &self,
        scan: &ScanResult,
        cache: &AnqpCache,
        tracker: &mut AnqpRequestManager,
        registry: &mut ProviderRegistry,
    ) -> MatchList {
        let mut result = self.all_matched_providers(scan, cache, tracker, registry);
        if result.matches.is_empty() {
            return result;
        }

        let now = self.clock.now_millis();
        let mut home = Vec::new();
        let mut roaming = Vec::new();
        for (provider, status) in std::mem::take(&mut result.matches) {
            if provider.profile().is_expired(now) {
                tracing::debug!("Subscription for {} has expired, skipping", provider.fqdn());
                continue;
            }
            match status {
                PasspointMatch::HomeProvider => home.push((provider, status)),
                _ => roaming.push((provider, status)),
            }
        }

        if !home.is_empty() {
            tracing::debug!("Matched {} to {} home providers", scan.ssid, home.len());
            result.matches = home;
        } else if !roaming.is_empty() {
            tracing::debug!("Matched {} to {} roaming providers", scan.ssid, roaming.len());
            result.matches = roaming;
        } else {
            tracing::debug!("No usable service provider for {}", scan.ssid);
        }
        result
    }
}
