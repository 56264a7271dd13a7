//! Core types for the renderer-control crate.
//!
//! These are the decoded request and response records exchanged with the
//! protocol engine. Decoding from and encoding to the wire (SOAP envelopes,
//! eventing HTTP) happens outside this crate.

use serde::{Deserialize, Serialize};

/// Unique identifier for a device service.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl ServiceId {
    /// Create a new service ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the service ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded action request, ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInvocation {
    /// Service the action is addressed to
    pub service_id: ServiceId,
    /// Name of the invoked action
    pub action_name: String,
    /// Inbound arguments in request order
    pub arguments: Vec<(String, String)>,
}

impl ActionInvocation {
    /// Create an invocation with no arguments.
    pub fn new(service_id: impl Into<ServiceId>, action_name: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            action_name: action_name.into(),
            arguments: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The success payload of a dispatched action.
///
/// Carries the action name and service type so the protocol engine can
/// frame the response element. An action with no declared output yields an
/// empty `arguments` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Name of the action that produced this response
    pub action: String,
    /// Service type URN of the owning service
    pub service_type: String,
    /// Outbound arguments in the order they were added
    pub arguments: Vec<(String, String)>,
}

impl ActionResponse {
    /// Look up a response argument by name.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the response carries no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// A decoded subscription request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Service being subscribed to
    pub service_id: ServiceId,
    /// Transport-level identity of the new subscriber
    pub subscriber_id: String,
}

impl SubscriptionRequest {
    /// Create a new subscription request.
    pub fn new(service_id: impl Into<ServiceId>, subscriber_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            subscriber_id: subscriber_id.into(),
        }
    }
}

/// A decoded state-variable query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateVariableQuery {
    /// Service owning the variable
    pub service_id: ServiceId,
    /// Name of the queried variable
    pub variable_name: String,
}

impl StateVariableQuery {
    /// Create a new state-variable query.
    pub fn new(service_id: impl Into<ServiceId>, variable_name: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            variable_name: variable_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_conversions() {
        let id = ServiceId::new("urn:upnp-org:serviceId:RenderingControl");
        assert_eq!(id.as_str(), "urn:upnp-org:serviceId:RenderingControl");
        assert_eq!(id.to_string(), "urn:upnp-org:serviceId:RenderingControl");

        let from_str: ServiceId = "rc".into();
        let from_string: ServiceId = String::from("rc").into();
        assert_eq!(from_str, from_string);
    }

    #[test]
    fn test_invocation_argument_lookup() {
        let invocation = ActionInvocation::new("rc", "SetVolume")
            .with_argument("InstanceID", "0")
            .with_argument("DesiredVolume", "20");

        assert_eq!(invocation.argument("DesiredVolume"), Some("20"));
        assert_eq!(invocation.argument("InstanceID"), Some("0"));
        assert_eq!(invocation.argument("Channel"), None);
    }

    #[test]
    fn test_response_argument_lookup() {
        let response = ActionResponse {
            action: "GetVolume".to_string(),
            service_type: "urn:schemas-upnp-org:service:RenderingControl:1".to_string(),
            arguments: vec![("CurrentVolume".to_string(), "20".to_string())],
        };

        assert!(!response.is_empty());
        assert_eq!(response.argument("CurrentVolume"), Some("20"));
        assert_eq!(response.argument("CurrentMute"), None);
    }
}
