//! Service configuration
//!
//! A device is assembled from static [`ServiceConfig`] values: each one
//! declares a service's identity, its state variables with initial values
//! (declaration order fixes the variable indexes handlers use), and its
//! actions. Configuration is validated when the device is built; a running
//! device never gains or loses services.

use std::sync::Arc;

use variable_store::{ChangeCollector, EventFilter, NotificationSink, VariableContainer};

use crate::error::ConfigError;
use crate::service::{Action, ActionHandler, Service};
use crate::types::ServiceId;

/// Declarative description of one service.
///
/// # Example
///
/// ```rust,ignore
/// let config = ServiceConfig::new(
///     "urn:upnp-org:serviceId:RenderingControl",
///     "urn:schemas-upnp-org:service:RenderingControl:1",
///     "urn:schemas-upnp-org:metadata-1-0/RCS/",
/// )
/// .variable("LastChange", "")
/// .variable("Volume", "50")
/// .handled_action("SetVolume", set_volume)
/// .action("X_Unsupported");
/// ```
pub struct ServiceConfig {
    service_id: String,
    service_type: String,
    event_namespace: String,
    filter: EventFilter,
    variables: Vec<(String, String)>,
    actions: Vec<Action>,
}

impl ServiceConfig {
    /// Start a configuration with the service's three identifiers.
    pub fn new(
        service_id: impl Into<String>,
        service_type: impl Into<String>,
        event_namespace: impl Into<String>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            service_type: service_type.into(),
            event_namespace: event_namespace.into(),
            filter: EventFilter::default(),
            variables: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Declare a state variable with its initial value. Declaration order
    /// assigns the variable's index.
    pub fn variable(mut self, name: impl Into<String>, initial: impl Into<String>) -> Self {
        self.variables.push((name.into(), initial.into()));
        self
    }

    /// Declare an action without a handler.
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(Action::new(name));
        self
    }

    /// Declare an action backed by `handler`.
    pub fn handled_action(
        mut self,
        name: impl Into<String>,
        handler: impl ActionHandler + 'static,
    ) -> Self {
        self.actions.push(Action::handled(name, handler));
        self
    }

    /// Replace the default eventing filter.
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The configured service ID.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Check the configuration for empty identifiers and duplicate names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_id.is_empty() {
            return Err(ConfigError::EmptyIdentifier("service id"));
        }
        if self.service_type.is_empty() {
            return Err(ConfigError::EmptyIdentifier("service type"));
        }
        if self.event_namespace.is_empty() {
            return Err(ConfigError::EmptyIdentifier("event namespace"));
        }

        for (position, (name, _)) in self.variables.iter().enumerate() {
            if name.is_empty() {
                return Err(ConfigError::EmptyIdentifier("variable name"));
            }
            if self.variables[..position].iter().any(|(n, _)| n == name) {
                return Err(ConfigError::DuplicateVariable {
                    service: self.service_id.clone(),
                    name: name.clone(),
                });
            }
        }

        for (position, action) in self.actions.iter().enumerate() {
            if action.name().is_empty() {
                return Err(ConfigError::EmptyIdentifier("action name"));
            }
            if self.actions[..position]
                .iter()
                .any(|a| a.name() == action.name())
            {
                return Err(ConfigError::DuplicateAction {
                    service: self.service_id.clone(),
                    name: action.name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate and materialize the service, wiring its collector to `sink`.
    pub(crate) fn build(self, sink: Arc<dyn NotificationSink>) -> Result<Service, ConfigError> {
        self.validate()?;

        let ServiceConfig {
            service_id,
            service_type,
            event_namespace,
            filter,
            variables,
            actions,
        } = self;

        let collector =
            ChangeCollector::new(service_id.clone(), event_namespace.clone(), filter, sink);
        let mut state = VariableContainer::new(collector);
        for (name, initial) in variables {
            state
                .register(name.clone(), initial)
                .map_err(|_| ConfigError::DuplicateVariable {
                    service: service_id.clone(),
                    name,
                })?;
        }

        tracing::debug!(
            "configured service {} with {} variable(s), {} action(s)",
            service_id,
            state.count(),
            actions.len()
        );
        Ok(Service::new(
            ServiceId::new(service_id),
            service_type,
            event_namespace,
            actions,
            state,
        ))
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("service_id", &self.service_id)
            .field("service_type", &self.service_type)
            .field("variables", &self.variables.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}
