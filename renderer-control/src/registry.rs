//! Service registry with duplicate protection
//!
//! Maps service identifiers to their [`Service`] records. The registry is
//! frozen once the device is built: lookups take no lock and registration
//! order is preserved for metadata enumeration.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::service::Service;
use crate::types::ServiceId;

/// Immutable id -> service map, fixed at device construction.
pub struct ServiceRegistry {
    /// Services in registration order
    services: Vec<Service>,
    /// Index into `services` by ID
    by_id: HashMap<ServiceId, usize>,
}

impl ServiceRegistry {
    /// Build the registry, rejecting duplicate service IDs.
    pub(crate) fn new(services: Vec<Service>) -> Result<Self, ConfigError> {
        let mut by_id = HashMap::with_capacity(services.len());
        for (index, service) in services.iter().enumerate() {
            if by_id.insert(service.id().clone(), index).is_some() {
                return Err(ConfigError::DuplicateService(service.id().to_string()));
            }
            tracing::debug!(
                "registered service {} ({})",
                service.id(),
                service.service_type()
            );
        }
        Ok(Self { services, by_id })
    }

    /// Look up a service by ID.
    pub fn find(&self, id: &ServiceId) -> Option<&Service> {
        self.by_id.get(id).map(|&index| &self.services[index])
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Iterate services in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Service> + '_ {
        self.services.iter()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}
