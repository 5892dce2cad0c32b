///! Installed provider: a profile plus its installation bookkeeping
use super::profile::PasspointProfile;
use serde::{Deserialize, Serialize};

/// Creation index assigned by the registry. Strictly increasing, never
/// reused, so it gives a stable ordering for logs and tie-breaks.
pub type ProviderId = u64;

/// A provisioned Passpoint provider as held in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasspointProvider {
    profile: PasspointProfile,
    provider_id: ProviderId,
    creator_uid: u32,
    package_name: Option<String>,
    from_suggestion: bool,
    has_ever_connected: bool,
}

impl PasspointProvider {
    pub fn new(
        profile: PasspointProfile,
        provider_id: ProviderId,
        creator_uid: u32,
        package_name: Option<String>,
        from_suggestion: bool,
    ) -> Self {
        Self {
            profile,
            provider_id,
            creator_uid,
            package_name,
            from_suggestion,
            has_ever_connected: false,
        }
    }

    pub fn profile(&self) -> &PasspointProfile {
        &self.profile
    }

    /// Mutable access for the identity-refresh hook during matching.
    pub fn profile_mut(&mut self) -> &mut PasspointProfile {
        &mut self.profile
    }

    pub fn fqdn(&self) -> &str {
        &self.profile.fqdn
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub fn creator_uid(&self) -> u32 {
        self.creator_uid
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn is_from_suggestion(&self) -> bool {
        self.from_suggestion
    }

    pub fn has_ever_connected(&self) -> bool {
        self.has_ever_connected
    }

    pub fn set_has_ever_connected(&mut self, connected: bool) {
        self.has_ever_connected = connected;
    }

    /// Key of the network record this provider induces in the external
    /// network store; removed when the provider is removed or replaced.
    pub fn network_key(&self) -> String {
        format!("passpoint-{}", self.profile.fqdn)
    }
}
