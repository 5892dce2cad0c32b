///! ANQP element model
///!
///! Elements are modeled as one tagged enum instead of an opaque payload per
///! type, so consumers match on a variant rather than downcasting.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// ANQP element identifiers this core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnqpElementType {
    VenueName,
    RoamingConsortium,
    IpAddrAvailability,
    NaiRealm,
    ThreeGppNetwork,
    DomainName,
    HsFriendlyName,
    HsWanMetrics,
    HsConnCapability,
    HsOsuProviders,
}

/// Element set fetched from one AP, keyed by element type.
pub type AnqpElements = HashMap<AnqpElementType, AnqpElement>;

/// Enrollment method offered by an OSU provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsuMethod {
    OmaDm,
    SoapXmlSpp,
}

/// OSU provider entry as carried in the HS 2.0 OSU Providers element.
///
/// Language-keyed maps use `BTreeMap` so the derived `Hash`/ordering are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OsuProviderInfo {
    /// SSID of the operator's open OSU ESS. Operator-scoped, not part of the
    /// provider's identity.
    pub osu_ssid: Option<String>,
    /// Friendly name per language tag.
    pub friendly_names: BTreeMap<String, String>,
    /// Service description per language tag.
    pub service_descriptions: BTreeMap<String, String>,
    pub server_uri: String,
    pub network_access_identifier: Option<String>,
    pub methods: Vec<OsuMethod>,
}

/// An online sign-up offer as exposed to callers.
///
/// Identical to [`OsuProviderInfo`] minus the OSU SSID: the SSID belongs to
/// whichever hotspot operator advertises the offer, so the same service
/// provider seen at two operators must compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OsuProvider {
    pub friendly_names: BTreeMap<String, String>,
    pub service_descriptions: BTreeMap<String, String>,
    pub server_uri: String,
    pub network_access_identifier: Option<String>,
    pub methods: Vec<OsuMethod>,
}

impl OsuProvider {
    /// Build the offer from a raw element entry, dropping the OSU SSID.
    pub fn from_info(info: &OsuProviderInfo) -> Self {
        Self {
            friendly_names: info.friendly_names.clone(),
            service_descriptions: info.service_descriptions.clone(),
            server_uri: info.server_uri.clone(),
            network_access_identifier: info.network_access_identifier.clone(),
            methods: info.methods.clone(),
        }
    }

    pub fn friendly_name(&self, language: &str) -> Option<&str> {
        self.friendly_names.get(language).map(String::as_str)
    }
}

/// One parsed ANQP element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnqpElement {
    VenueName(Vec<String>),
    /// Organization identifiers of the roaming consortium.
    RoamingConsortium(Vec<u64>),
    IpAddrAvailability { ipv4: u8, ipv6: u8 },
    /// NAI realms the AP can authenticate against.
    NaiRealm(Vec<String>),
    /// PLMN identifiers for cellular offload.
    ThreeGppNetwork(Vec<String>),
    /// Operator domain names; the basis for home-provider classification.
    DomainName(Vec<String>),
    HsFriendlyName(BTreeMap<String, String>),
    HsWanMetrics { downlink_kbps: u32, uplink_kbps: u32 },
    /// (protocol, port, status) tuples from the connection capability element.
    HsConnCapability(Vec<(u8, u16, u8)>),
    HsOsuProviders(Vec<OsuProviderInfo>),
}

impl AnqpElement {
    pub fn element_type(&self) -> AnqpElementType {
        match self {
            AnqpElement::VenueName(_) => AnqpElementType::VenueName,
            AnqpElement::RoamingConsortium(_) => AnqpElementType::RoamingConsortium,
            AnqpElement::IpAddrAvailability { .. } => AnqpElementType::IpAddrAvailability,
            AnqpElement::NaiRealm(_) => AnqpElementType::NaiRealm,
            AnqpElement::ThreeGppNetwork(_) => AnqpElementType::ThreeGppNetwork,
            AnqpElement::DomainName(_) => AnqpElementType::DomainName,
            AnqpElement::HsFriendlyName(_) => AnqpElementType::HsFriendlyName,
            AnqpElement::HsWanMetrics { .. } => AnqpElementType::HsWanMetrics,
            AnqpElement::HsConnCapability(_) => AnqpElementType::HsConnCapability,
            AnqpElement::HsOsuProviders(_) => AnqpElementType::HsOsuProviders,
        }
    }
}

/// Collect parsed elements into the type-keyed map stored in the cache.
/// A later element of the same type replaces the earlier one.
pub fn element_map(elements: impl IntoIterator<Item = AnqpElement>) -> AnqpElements {
    elements
        .into_iter()
        .map(|e| (e.element_type(), e))
        .collect()
}
