///! Passpoint subscription profile (the stored credential configuration)
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Validation failures for a profile submitted through the public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile FQDN is empty")]
    EmptyFqdn,
    #[error("profile friendly name is empty")]
    EmptyFriendlyName,
    #[error("subscription expiration time {0} is not a valid timestamp")]
    InvalidExpiration(i64),
}

/// A service provider subscription as provisioned by the user or an app.
///
/// The FQDN is the provider's identity: two profiles with the same FQDN are
/// the same subscription, and installing the second replaces the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasspointProfile {
    pub fqdn: String,
    pub friendly_name: String,
    /// Friendly name per language tag, used for OSU correlation.
    #[serde(default)]
    pub service_friendly_names: BTreeMap<String, String>,
    /// R2 update identifier. `None` marks a legacy R1 profile, whose CA
    /// chain must be anchored in the platform trust store before install.
    #[serde(default)]
    pub update_identifier: Option<u32>,
    /// DER-encoded CA certificates. Opaque to this core; trust verification
    /// is an external capability.
    #[serde(default)]
    pub ca_certificates: Vec<Vec<u8>>,
    /// Subscription expiration in epoch millis. `None` means never expires.
    #[serde(default)]
    pub subscription_expiration_millis: Option<i64>,
}

impl PasspointProfile {
    pub fn new(fqdn: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        Self {
            fqdn: fqdn.into(),
            friendly_name: friendly_name.into(),
            service_friendly_names: BTreeMap::new(),
            update_identifier: None,
            ca_certificates: Vec::new(),
            subscription_expiration_millis: None,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.fqdn.is_empty() {
            return Err(ProfileError::EmptyFqdn);
        }
        if self.friendly_name.is_empty() {
            return Err(ProfileError::EmptyFriendlyName);
        }
        if let Some(expiration) = self.subscription_expiration_millis {
            if expiration <= 0 {
                return Err(ProfileError::InvalidExpiration(expiration));
            }
        }
        Ok(())
    }

    /// Legacy R1 profiles carry no update identifier.
    pub fn is_legacy_r1(&self) -> bool {
        self.update_identifier.is_none()
    }

    /// Whether the subscription has an expiration time that has passed.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        match self.subscription_expiration_millis {
            Some(expiration) => now_millis >= expiration,
            None => false,
        }
    }

    pub fn service_friendly_name(&self, language: &str) -> Option<&str> {
        self.service_friendly_names.get(language).map(String::as_str)
    }
}
