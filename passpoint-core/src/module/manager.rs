///! Passpoint manager: provider lifecycle, matching entry points and
///! event ingestion
use crate::clock::Clock;
use crate::mac::MacAddress;
use crate::module::anqp::{
    AnqpCache, AnqpElements, AnqpNetworkKey, AnqpRequestManager, AnqpRequester,
};
use crate::module::events::{PasspointEvent, WnmNotice};
use crate::module::matching::{self, MatchList, MatchingEngine, PasspointMatch, ProviderMatcher};
use crate::module::provider::{PasspointProfile, PasspointProvider, ProviderRegistry};
use crate::scan::ScanResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

// ============ Collaborator seams ============

/// Validates CA certificates carried by legacy (release 1) profiles.
pub trait CertificateVerifier: Send + Sync {
    fn verify_ca_cert(&self, cert_der: &[u8]) -> bool;
}

/// Installs and removes the certificates and keys a provider needs for EAP
/// authentication.
pub trait ProviderKeyStore: Send + Sync {
    fn install_certs_and_keys(&self, provider: &PasspointProvider) -> bool;
    fn uninstall_certs_and_keys(&self, provider: &PasspointProvider);
}

/// Owns durable network configuration outside this crate.
pub trait NetworkConfigStore: Send + Sync {
    /// Ask for the current provider set to be written out. `force_write`
    /// bypasses any write batching the store does.
    fn request_save(&self, force_write: bool);
    /// Drop any saved network configuration derived from a provider.
    fn remove_passpoint_network(&self, network_key: &str);
}

/// Delivers icon responses and WNM notifications to interested listeners.
pub trait NoticeBroadcaster: Send + Sync {
    fn broadcast_icon_response(&self, bssid: MacAddress, file_name: &str, data: Option<&[u8]>);
    fn broadcast_wnm_notice(&self, notice: &WnmNotice);
}

// ============ Metrics ============

/// Install/uninstall counters plus a point-in-time provider census.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PasspointMetrics {
    pub provider_installs: u64,
    pub provider_install_successes: u64,
    pub provider_uninstalls: u64,
    pub provider_uninstall_successes: u64,
    pub num_providers: usize,
    pub num_connected_providers: usize,
}

// ============ Manager ============

/// Ties the registry, the ANQP cache and tracker, and the matching engine
/// together behind one `&mut self` surface. All state lives here; external
/// effects go through the collaborator traits.
pub struct PasspointManager {
    registry: ProviderRegistry,
    anqp_cache: AnqpCache,
    request_manager: AnqpRequestManager,
    engine: MatchingEngine,
    cert_verifier: Arc<dyn CertificateVerifier>,
    key_store: Arc<dyn ProviderKeyStore>,
    config_store: Arc<dyn NetworkConfigStore>,
    broadcaster: Arc<dyn NoticeBroadcaster>,
    clock: Arc<dyn Clock>,
    metrics: PasspointMetrics,
}

impl PasspointManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        requester: Arc<dyn AnqpRequester>,
        matcher: Arc<dyn ProviderMatcher>,
        cert_verifier: Arc<dyn CertificateVerifier>,
        key_store: Arc<dyn ProviderKeyStore>,
        config_store: Arc<dyn NetworkConfigStore>,
        broadcaster: Arc<dyn NoticeBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry: ProviderRegistry::new(),
            anqp_cache: AnqpCache::new(clock.clone()),
            request_manager: AnqpRequestManager::new(requester),
            engine: MatchingEngine::new(matcher, clock.clone()),
            cert_verifier,
            key_store,
            config_store,
            broadcaster,
            clock,
            metrics: PasspointMetrics::default(),
        }
    }

    // ============ Provider lifecycle ============

    /// Install a provider, or replace the one already registered under the
    /// same FQDN. Returns whether the provider was installed.
    pub fn add_or_update_provider(
        &mut self,
        profile: PasspointProfile,
        calling_uid: u32,
        package_name: Option<String>,
        from_suggestion: bool,
    ) -> bool {
        self.metrics.provider_installs += 1;

        if let Err(e) = profile.validate() {
            tracing::error!("Invalid Passpoint profile for {}: {}", profile.fqdn, e);
            return false;
        }

        // Release 1 profiles carry no trust root provisioned over OSU, so
        // their CA certificates must be vetted before installation.
        if profile.is_legacy_r1() {
            if profile.ca_certificates.is_empty() {
                tracing::error!("Legacy profile for {} has no CA certificate", profile.fqdn);
                return false;
            }
            for cert in &profile.ca_certificates {
                if !self.cert_verifier.verify_ca_cert(cert) {
                    tracing::error!("Untrusted CA certificate in profile for {}", profile.fqdn);
                    return false;
                }
            }
        }

        let provider_id = self.registry.allocate_provider_id();
        let provider = PasspointProvider::new(
            profile,
            provider_id,
            calling_uid,
            package_name,
            from_suggestion,
        );

        if !self.key_store.install_certs_and_keys(&provider) {
            tracing::error!("Failed to install certs and keys for {}", provider.fqdn());
            return false;
        }

        let fqdn = provider.fqdn().to_string();
        if let Some(old) = self.registry.remove(&fqdn) {
            // An app suggestion may not silently take over another package's
            // subscription.
            if provider.is_from_suggestion() && old.package_name() != provider.package_name() {
                tracing::error!(
                    "Suggested profile for {} conflicts with one from {:?}",
                    fqdn,
                    old.package_name()
                );
                self.key_store.uninstall_certs_and_keys(&provider);
                self.registry.insert(old);
                return false;
            }

            tracing::info!("Replacing Passpoint provider for {}", fqdn);
            self.key_store.uninstall_certs_and_keys(&old);
            if old.profile() != provider.profile() {
                self.config_store.remove_passpoint_network(&old.network_key());
            }
        }

        self.registry.insert(provider);
        self.config_store.request_save(true);
        self.metrics.provider_install_successes += 1;
        self.update_metrics();
        tracing::info!("Added/updated Passpoint provider for {}", fqdn);
        true
    }

    /// Remove the provider registered under `fqdn`. Non-privileged callers
    /// may only remove providers they created.
    pub fn remove_provider(&mut self, calling_uid: u32, privileged: bool, fqdn: &str) -> bool {
        self.metrics.provider_uninstalls += 1;

        let Some(provider) = self.registry.get(fqdn) else {
            tracing::error!("No Passpoint provider found for {}", fqdn);
            return false;
        };
        if !privileged && provider.creator_uid() != calling_uid {
            tracing::error!(
                "uid {} may not remove the provider for {} created by uid {}",
                calling_uid,
                fqdn,
                provider.creator_uid()
            );
            return false;
        }

        // get() established presence.
        let Some(provider) = self.registry.remove(fqdn) else {
            return false;
        };
        self.key_store.uninstall_certs_and_keys(&provider);
        self.config_store.remove_passpoint_network(&provider.network_key());
        self.config_store.request_save(true);
        self.metrics.provider_uninstall_successes += 1;
        self.update_metrics();
        tracing::info!("Removed Passpoint provider for {}", fqdn);
        true
    }

    /// Remove every provider installed by `package_name`. Returns the FQDNs
    /// removed.
    pub fn remove_providers_for_package(&mut self, package_name: &str) -> Vec<String> {
        let fqdns: Vec<String> = self
            .registry
            .providers()
            .filter(|p| p.package_name() == Some(package_name))
            .map(|p| p.fqdn().to_string())
            .collect();
        for fqdn in &fqdns {
            self.remove_provider(0, true, fqdn);
        }
        fqdns
    }

    /// Profiles visible to a caller: everything for privileged callers,
    /// otherwise only profiles the caller installed. Suggestion-installed
    /// profiles are managed by their app and never listed here.
    pub fn provider_configs(&self, calling_uid: u32, privileged: bool) -> Vec<PasspointProfile> {
        self.registry
            .providers_by_id()
            .into_iter()
            .filter(|p| !p.is_from_suggestion() && (privileged || p.creator_uid() == calling_uid))
            .map(|p| p.profile().clone())
            .collect()
    }

    // ============ Matching ============

    /// Providers usable for network selection on this AP; home matches
    /// shadow roaming ones.
    pub fn match_provider(&mut self, scan: &ScanResult) -> Vec<(PasspointProvider, PasspointMatch)> {
        let result = self.engine.match_provider(
            scan,
            &self.anqp_cache,
            &mut self.request_manager,
            &mut self.registry,
        );
        self.save_if_updated(&result);
        result.matches
    }

    /// Every provider/AP classification, home and roaming alike.
    pub fn all_matched_providers(
        &mut self,
        scan: &ScanResult,
    ) -> Vec<(PasspointProvider, PasspointMatch)> {
        let result = self.engine.all_matched_providers(
            scan,
            &self.anqp_cache,
            &mut self.request_manager,
            &mut self.registry,
        );
        self.save_if_updated(&result);
        result.matches
    }

    fn save_if_updated(&mut self, result: &MatchList) {
        if result.providers_updated {
            self.config_store.request_save(true);
        }
    }

    /// The cached ANQP elements for an AP. Purely a cache read: a miss
    /// yields an empty map and no request is issued.
    pub fn anqp_elements(&self, scan: &ScanResult) -> AnqpElements {
        let bssid: MacAddress = match scan.bssid.parse() {
            Ok(bssid) => bssid,
            Err(e) => {
                tracing::error!("Invalid BSSID in scan result '{}': {}", scan.bssid, e);
                return AnqpElements::new();
            }
        };
        let key = AnqpNetworkKey::build(&scan.ssid, bssid, scan.hessid, scan.anqp_domain_id);
        self.anqp_cache
            .get_entry(&key)
            .map(|entry| entry.elements().clone())
            .unwrap_or_default()
    }

    /// For each provider FQDN, the scanned APs it matches, grouped by match
    /// kind. Only Passpoint-capable APs are considered.
    pub fn all_matching_fqdns_for_scans(
        &mut self,
        scans: &[ScanResult],
    ) -> HashMap<String, HashMap<PasspointMatch, Vec<ScanResult>>> {
        let mut fqdns: HashMap<String, HashMap<PasspointMatch, Vec<ScanResult>>> = HashMap::new();
        for scan in scans {
            if !scan.is_passpoint {
                continue;
            }
            for (provider, status) in self.all_matched_providers(scan) {
                fqdns
                    .entry(provider.fqdn().to_string())
                    .or_default()
                    .entry(status)
                    .or_default()
                    .push(scan.clone());
            }
        }
        fqdns
    }

    // ============ Online sign-up ============

    pub fn matching_osu_providers(
        &self,
        scans: &[ScanResult],
    ) -> HashMap<crate::module::anqp::OsuProvider, Vec<ScanResult>> {
        matching::matching_osu_providers(scans, &self.anqp_cache)
    }

    pub fn matching_profiles_for_osu_providers(
        &self,
        offers: &[crate::module::anqp::OsuProvider],
    ) -> HashMap<crate::module::anqp::OsuProvider, PasspointProfile> {
        matching::matching_profiles_for_osu_providers(offers, &self.registry)
    }

    /// Ask the AP for an icon file; the response arrives as an event.
    pub fn query_passpoint_icon(&self, bssid: MacAddress, file_name: &str) -> bool {
        self.request_manager.request_icon(bssid, file_name)
    }

    // ============ Connection tracking ============

    /// Record a successful connection through the provider for `fqdn`. Only
    /// the first transition dirties the provider set.
    pub fn on_passpoint_network_connected(&mut self, fqdn: &str) {
        let Some(provider) = self.registry.get_mut(fqdn) else {
            tracing::error!("Connected to {} but no provider is registered", fqdn);
            return;
        };
        if !provider.has_ever_connected() {
            provider.set_has_ever_connected(true);
            self.config_store.request_save(true);
        }
        self.update_metrics();
    }

    // ============ Event ingestion ============

    pub fn handle_event(&mut self, event: PasspointEvent) {
        match event {
            PasspointEvent::AnqpResponse { bssid, elements } => {
                let key = self
                    .request_manager
                    .on_request_completed(bssid, elements.is_some());
                if let (Some(elements), Some(key)) = (elements, key) {
                    tracing::info!("Received ANQP response for {}: {} elements", key, elements.len());
                    self.anqp_cache.add_entry(key, elements);
                }
            }
            PasspointEvent::IconResponse {
                bssid,
                file_name,
                data,
            } => {
                self.broadcaster
                    .broadcast_icon_response(bssid, &file_name, data.as_deref());
            }
            PasspointEvent::WnmNotice(notice) => {
                self.broadcaster.broadcast_wnm_notice(&notice);
            }
            PasspointEvent::SweepCache => self.sweep_cache(),
        }
    }

    /// Evict expired ANQP cache entries.
    pub fn sweep_cache(&mut self) {
        self.anqp_cache.sweep();
    }

    // ============ Snapshot surface ============

    /// Clone of the provider set in creation order, for persistence.
    pub fn providers_snapshot(&self) -> Vec<PasspointProvider> {
        self.registry.providers_snapshot()
    }

    /// Replace the provider set wholesale, as read back from storage.
    pub fn set_providers(&mut self, providers: Vec<PasspointProvider>) {
        self.registry.set_providers(providers);
        self.update_metrics();
    }

    pub fn provider_index(&self) -> u64 {
        self.registry.provider_index()
    }

    pub fn set_provider_index(&mut self, index: u64) {
        self.registry.set_provider_index(index);
    }

    // ============ Introspection ============

    fn update_metrics(&mut self) {
        self.metrics.num_providers = self.registry.len();
        self.metrics.num_connected_providers = self
            .registry
            .providers()
            .filter(|p| p.has_ever_connected())
            .count();
    }

    pub fn metrics(&self) -> PasspointMetrics {
        self.metrics
    }

    /// Human-readable state dump for diagnostics.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Dump of PasspointManager");
        let _ = writeln!(out, "  now: {}", self.clock.now_millis());
        let _ = writeln!(out, "  pending ANQP requests: {}", self.request_manager.pending_count());
        let _ = writeln!(out, "  cached ANQP entries: {}", self.anqp_cache.len());
        let _ = writeln!(out, "  providers ({}):", self.registry.len());
        for provider in self.registry.providers_by_id() {
            let _ = writeln!(
                out,
                "    [{}] {} uid={} package={:?} suggestion={} connected={}",
                provider.provider_id(),
                provider.fqdn(),
                provider.creator_uid(),
                provider.package_name(),
                provider.is_from_suggestion(),
                provider.has_ever_connected()
            );
        }
        let _ = writeln!(out, "  metrics: {:?}", self.metrics);
        out
    }
}
