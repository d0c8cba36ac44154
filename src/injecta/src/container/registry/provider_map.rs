use std::collections::HashMap;
use std::sync::Arc;

use crate::container::registry::Registration;
use crate::id::{IdentityMap, ServiceId, ServiceRef};

/// The registration records of a container together with the identifiers
/// its service types were registered under.
#[derive(Debug)]
pub struct ProviderMap {
    records: HashMap<ServiceId, Arc<Registration>>,
    identities: IdentityMap,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            identities: IdentityMap::new(),
        }
    }

    /// Stores `record`, replacing whatever was registered under the same
    /// identifier, and returns the replaced record.
    pub fn insert(&mut self, record: Registration) -> Option<Arc<Registration>> {
        if let Some(class) = record.class() {
            self.identities.insert(*class, record.id().clone());
        }
        self.records
            .insert(record.id().clone(), Arc::new(record))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Registration>> {
        self.records.get(id)
    }

    pub fn identify(&self, reference: &ServiceRef) -> ServiceId {
        self.identities.resolve(reference)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ServiceId> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
