///! Provider registry keyed by FQDN
use super::provider::{PasspointProvider, ProviderId};
use std::collections::HashMap;

/// In-memory set of installed providers.
///
/// The registry also owns the provider-id allocator. Ids are consumed even
/// when an install later fails, so an id observed anywhere is never
/// ambiguous. The id counter and the provider list are handed to the
/// external persistence layer verbatim through the snapshot surface.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, PasspointProvider>,
    next_provider_id: ProviderId,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next creation index. Never reused.
    pub fn allocate_provider_id(&mut self) -> ProviderId {
        let id = self.next_provider_id;
        self.next_provider_id += 1;
        id
    }

    /// Insert keyed by FQDN, returning the provider this one replaced.
    pub fn insert(&mut self, provider: PasspointProvider) -> Option<PasspointProvider> {
        let fqdn = provider.fqdn().to_string();
        self.providers.insert(fqdn, provider)
    }

    pub fn remove(&mut self, fqdn: &str) -> Option<PasspointProvider> {
        self.providers.remove(fqdn)
    }

    pub fn get(&self, fqdn: &str) -> Option<&PasspointProvider> {
        self.providers.get(fqdn)
    }

    pub fn get_mut(&mut self, fqdn: &str) -> Option<&mut PasspointProvider> {
        self.providers.get_mut(fqdn)
    }

    pub fn providers(&self) -> impl Iterator<Item = &PasspointProvider> {
        self.providers.values()
    }

    pub fn providers_mut(&mut self) -> impl Iterator<Item = &mut PasspointProvider> {
        self.providers.values_mut()
    }

    /// Providers in ascending creation order, for deterministic iteration.
    pub fn providers_by_id(&self) -> Vec<&PasspointProvider> {
        let mut ordered: Vec<&PasspointProvider> = self.providers.values().collect();
        ordered.sort_by_key(|p| p.provider_id());
        ordered
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    // ============ Persistence Snapshot Surface ============

    /// Provider list as handed to the persistence collaborator, in creation
    /// order.
    pub fn providers_snapshot(&self) -> Vec<PasspointProvider> {
        self.providers_by_id().into_iter().cloned().collect()
    }

    /// Replace the registry content from a persisted list.
    pub fn set_providers(&mut self, providers: Vec<PasspointProvider>) {
        self.providers.clear();
        for provider in providers {
            self.insert(provider);
        }
    }

    pub fn provider_index(&self) -> ProviderId {
        self.next_provider_id
    }

    pub fn set_provider_index(&mut self, index: ProviderId) {
        self.next_provider_id = index;
    }
}
