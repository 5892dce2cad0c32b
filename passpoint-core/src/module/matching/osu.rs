///! Online sign-up offer correlation
use crate::mac::MacAddress;
use crate::module::anqp::{AnqpCache, AnqpElement, AnqpElementType, AnqpNetworkKey, OsuProvider};
use crate::module::provider::{PasspointProfile, ProviderRegistry};
use crate::scan::ScanResult;
use std::collections::HashMap;

/// Collect the OSU offers advertised by a set of scanned APs, grouped by
/// offer. An offer advertised from several APs carries them all, so the
/// caller can pick the strongest signal when it starts sign-up.
///
/// Cache-hit only: APs whose ANQP data has not been fetched yet contribute
/// nothing, and no requests are issued here.
pub fn matching_osu_providers(
    scans: &[ScanResult],
    cache: &AnqpCache,
) -> HashMap<OsuProvider, Vec<ScanResult>> {
    let mut offers: HashMap<OsuProvider, Vec<ScanResult>> = HashMap::new();
    for scan in scans {
        if !scan.is_passpoint {
            continue;
        }
        let bssid: MacAddress = match scan.bssid.parse() {
            Ok(bssid) => bssid,
            Err(e) => {
                tracing::error!("Invalid BSSID in scan result '{}': {}", scan.bssid, e);
                continue;
            }
        };
        let key = AnqpNetworkKey::build(&scan.ssid, bssid, scan.hessid, scan.anqp_domain_id);
        let Some(entry) = cache.get_entry(&key) else {
            continue;
        };
        let Some(AnqpElement::HsOsuProviders(infos)) =
            entry.elements().get(&AnqpElementType::HsOsuProviders)
        else {
            continue;
        };
        for info in infos {
            offers
                .entry(OsuProvider::from_info(info))
                .or_default()
                .push(scan.clone());
        }
    }
    offers
}

/// Correlate OSU offers with installed subscriptions: an offer is claimed by
/// the first provider (in creation order) whose profile carries the same
/// friendly name under a language tag both sides share. At most one provider
/// per offer.
pub fn matching_profiles_for_osu_providers(
    offers: &[OsuProvider],
    registry: &ProviderRegistry,
) -> HashMap<OsuProvider, PasspointProfile> {
    let mut matched = HashMap::new();
    for offer in offers {
        'providers: for provider in registry.providers_by_id() {
            for (lang, name) in provider.profile().service_friendly_names.iter() {
                if offer.friendly_names.get(lang) == Some(name) {
                    matched.insert(offer.clone(), provider.profile().clone());
                    break 'providers;
                }
            }
        }
    }
    matched
}
