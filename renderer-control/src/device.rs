//! The renderer device context
//!
//! [`RendererDevice`] is the single object the protocol engine talks to.
//! It owns the service registry and the notification sink, and exposes the
//! three request paths (action dispatch, subscription acceptance, variable
//! query) plus the local mutation paths a playback backend uses to drive
//! service state from inside the process.
//!
//! # Architecture
//!
//! ```text
//! protocol engine                 RendererDevice
//! ───────────────                 ──────────────
//! ActionInvocation      ──────▶   dispatch_action ──▶ handler under lock,
//!                                                     collector start/finish
//! SubscriptionRequest   ──────▶   subscribe ────────▶ snapshot under lock,
//!                                                     sink.accept_subscription
//! StateVariableQuery    ──────▶   query_variable ───▶ read under lock
//!
//! playback backend
//! ────────────────
//! update_service(f)     ──────▶   f(&mut variables) under lock,
//!                                 collector start/finish
//! ```
//!
//! Each service has exactly one lock; the device never holds two service
//! locks at once, so there is no lock ordering to maintain.

use std::sync::Arc;

use variable_store::{LastChangeBuilder, NotificationSink, VariableContainer};

use crate::config::ServiceConfig;
use crate::error::{ConfigError, ControlError, Result};
use crate::event::ActionEvent;
use crate::registry::ServiceRegistry;
use crate::service::Service;
use crate::types::{ActionInvocation, ActionResponse, ServiceId, StateVariableQuery, SubscriptionRequest};

/// Device-side control plane: services, their state, and change eventing.
///
/// Construct one per device process with [`RendererDevice::builder`].
/// All methods take `&self` and are safe to call from concurrent worker
/// threads; per-service locking serializes where it must.
pub struct RendererDevice {
    registry: ServiceRegistry,
    sink: Arc<dyn NotificationSink>,
}

impl RendererDevice {
    /// Start configuring a device.
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::new()
    }

    /// Dispatch one decoded action request.
    ///
    /// Resolution failures return [`ControlError::ServiceNotFound`] or
    /// [`ControlError::ActionNotFound`] without touching the service's
    /// change collector. A handled action runs under the service lock
    /// inside a collector transaction that is closed even when the handler
    /// faults or panics, so mutations made before a failure are still
    /// published. A declared action without a handler returns an empty
    /// success response and leaves the collector untouched.
    pub fn dispatch_action(&self, invocation: &ActionInvocation) -> Result<ActionResponse> {
        let service = match self.registry.find(&invocation.service_id) {
            Some(service) => service,
            None => {
                tracing::warn!(
                    "action {} addressed to unknown service {}",
                    invocation.action_name,
                    invocation.service_id
                );
                return Err(ControlError::ServiceNotFound(
                    invocation.service_id.to_string(),
                ));
            }
        };

        let action = match service.find_action(&invocation.action_name) {
            Some(action) => action,
            None => {
                tracing::error!(
                    "unknown action '{}' for service '{}'",
                    invocation.action_name,
                    invocation.service_id
                );
                return Err(ControlError::ActionNotFound {
                    service: invocation.service_id.to_string(),
                    action: invocation.action_name.clone(),
                });
            }
        };

        let Some(handler) = action.handler() else {
            tracing::error!(
                "action '{}' on service '{}' has no handler; returning empty success",
                invocation.action_name,
                invocation.service_id
            );
            return Ok(ActionResponse {
                action: invocation.action_name.clone(),
                service_type: service.service_type().to_string(),
                arguments: Vec::new(),
            });
        };

        tracing::debug!(
            "dispatching {} on {} with {} argument(s)",
            invocation.action_name,
            invocation.service_id,
            invocation.arguments.len()
        );

        let mut state = service.lock_state();
        // The guard closes the transaction on drop, so the pairing holds
        // even when the handler panics; partial progress made before a
        // failure is published either way.
        let mut transaction = state.transaction();
        let result = {
            let mut event = ActionEvent::new(
                invocation,
                service.id(),
                service.service_type(),
                &mut *transaction,
            );
            if let Err(fault) = handler.invoke(&mut event) {
                event.record_fault(fault);
            }
            event.into_result()
        };
        drop(transaction);
        drop(state);

        match &result {
            Ok(response) => tracing::debug!(
                "{} on {} completed with {} response argument(s)",
                invocation.action_name,
                invocation.service_id,
                response.arguments.len()
            ),
            Err(fault) => tracing::debug!(
                "{} on {} faulted with code {}",
                invocation.action_name,
                invocation.service_id,
                fault.fault_code()
            ),
        }
        result
    }

    /// Accept a new subscriber, delivering the initial full-state snapshot.
    ///
    /// The snapshot is built and handed to the sink while the service lock
    /// is held, so no concurrent mutation can be half-included. Evented
    /// variables only; the aggregate variable and silent-prefixed names are
    /// skipped. Returns the snapshot document.
    pub fn subscribe(&self, request: &SubscriptionRequest) -> Result<String> {
        let service = self.registry.find(&request.service_id).ok_or_else(|| {
            tracing::warn!("subscription for unknown service {}", request.service_id);
            ControlError::ServiceNotFound(request.service_id.to_string())
        })?;

        tracing::info!(
            "accepting subscriber {} on {}",
            request.subscriber_id,
            request.service_id
        );

        let state = service.lock_state();
        let filter = state.collector().filter();
        let mut builder = LastChangeBuilder::new(service.event_namespace());
        for (name, value) in state.iter() {
            if filter.is_evented(name) {
                builder.add(name, value);
            }
        }
        let document = builder.build();
        let initial = [(filter.aggregate_name().to_string(), document.clone())];
        self.sink
            .accept_subscription(service.id().as_str(), &request.subscriber_id, &initial);
        drop(state);

        Ok(document)
    }

    /// Answer a direct state-variable query.
    ///
    /// Any declared variable is queryable, including non-evented ones.
    pub fn query_variable(&self, query: &StateVariableQuery) -> Result<String> {
        let service = self.registry.find(&query.service_id).ok_or_else(|| {
            tracing::warn!("variable query for unknown service {}", query.service_id);
            ControlError::ServiceNotFound(query.service_id.to_string())
        })?;

        let state = service.lock_state();
        let value = state
            .iter()
            .find(|(name, _)| *name == query.variable_name)
            .map(|(_, value)| value.to_string());
        drop(state);

        match value {
            Some(value) => {
                tracing::debug!(
                    "variable query {} on {} -> {:?}",
                    query.variable_name,
                    query.service_id,
                    value
                );
                Ok(value)
            }
            None => {
                tracing::warn!(
                    "query for undeclared variable {} on {}",
                    query.variable_name,
                    query.service_id
                );
                Err(ControlError::InvalidVariable {
                    service: query.service_id.to_string(),
                    name: query.variable_name.clone(),
                })
            }
        }
    }

    /// Run a state mutation from inside the process (a playback backend
    /// reporting progress) under the service lock, bracketed so the whole
    /// closure yields at most one notification. The bracket closes even
    /// when the closure panics; changes made before the unwind are still
    /// published.
    pub fn update_service<R>(
        &self,
        service_id: &ServiceId,
        update: impl FnOnce(&mut VariableContainer) -> R,
    ) -> Result<R> {
        let service = self
            .registry
            .find(service_id)
            .ok_or_else(|| ControlError::ServiceNotFound(service_id.to_string()))?;

        let mut state = service.lock_state();
        let mut transaction = state.transaction();
        let output = update(&mut *transaction);
        drop(transaction);
        drop(state);
        Ok(output)
    }

    /// Run a consistent read of a service's variables under its lock.
    pub fn read_service<R>(
        &self,
        service_id: &ServiceId,
        read: impl FnOnce(&VariableContainer) -> R,
    ) -> Result<R> {
        let service = self
            .registry
            .find(service_id)
            .ok_or_else(|| ControlError::ServiceNotFound(service_id.to_string()))?;

        let state = service.lock_state();
        Ok(read(&*state))
    }

    /// Look up a service's metadata record.
    pub fn find_service(&self, service_id: &ServiceId) -> Option<&Service> {
        self.registry.find(service_id)
    }

    /// Iterate services in registration order.
    pub fn services(&self) -> impl Iterator<Item = &Service> + '_ {
        self.registry.iter()
    }

    /// Number of registered services.
    pub fn service_count(&self) -> usize {
        self.registry.len()
    }
}

impl std::fmt::Debug for RendererDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererDevice")
            .field("services", &self.registry.len())
            .finish()
    }
}

/// Assembles a [`RendererDevice`] from service configurations and a sink.
pub struct DeviceBuilder {
    services: Vec<ServiceConfig>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl DeviceBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
            sink: None,
        }
    }

    /// Add one service configuration.
    pub fn service(mut self, config: ServiceConfig) -> Self {
        self.services.push(config);
        self
    }

    /// Set the notification sink all services emit into.
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate every configuration and assemble the device.
    pub fn build(self) -> std::result::Result<RendererDevice, ConfigError> {
        let sink = self.sink.ok_or(ConfigError::MissingSink)?;

        let mut services = Vec::with_capacity(self.services.len());
        for config in self.services {
            services.push(config.build(Arc::clone(&sink))?);
        }
        let registry = ServiceRegistry::new(services)?;

        tracing::info!("renderer device ready with {} service(s)", registry.len());
        Ok(RendererDevice { registry, sink })
    }
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
