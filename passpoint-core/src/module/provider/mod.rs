///! Provider profiles and the FQDN-keyed registry

// ============ Subscription Profile ============
mod profile;
pub use profile::{PasspointProfile, ProfileError};

// ============ Installed Provider ============
mod provider;
pub use provider::{PasspointProvider, ProviderId};

// ============ Registry ============
mod registry;
pub use registry::ProviderRegistry;
