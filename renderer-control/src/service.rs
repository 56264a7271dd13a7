//! Service records: actions, variables, and the per-service lock
//!
//! A [`Service`] groups one variable container, one change collector (owned
//! by the container), and an immutable action registry behind a single
//! `parking_lot` mutex. Every mutation or consistent read of service state
//! goes through that lock; the action registry itself is frozen at
//! construction and needs no locking.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use variable_store::VariableContainer;

use crate::error::Result;
use crate::event::ActionEvent;
use crate::types::ServiceId;

/// A registered action handler.
///
/// Handlers run synchronously on the dispatching thread while the service
/// lock is held, bracketed by the change collector's transaction. They must
/// not call back into the device for the same service.
///
/// Any `Fn(&mut ActionEvent) -> Result<()>` that is `Send + Sync`
/// implements this trait, so plain functions and capture-free closures
/// register directly.
pub trait ActionHandler: Send + Sync {
    /// Execute the action against the event context.
    ///
    /// Returning `Err` faults the invocation unless the handler already
    /// recorded a more specific fault through the event.
    fn invoke(&self, event: &mut ActionEvent<'_>) -> Result<()>;
}

impl<F> ActionHandler for F
where
    F: Fn(&mut ActionEvent<'_>) -> Result<()> + Send + Sync,
{
    fn invoke(&self, event: &mut ActionEvent<'_>) -> Result<()> {
        self(event)
    }
}

/// A named action with an optional handler.
///
/// Declared actions without a handler are part of the service description
/// but return an empty success response when invoked.
pub struct Action {
    name: String,
    handler: Option<Arc<dyn ActionHandler>>,
}

impl Action {
    /// Declare an action with no handler.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
        }
    }

    /// Declare an action backed by `handler`.
    pub fn handled(name: impl Into<String>, handler: impl ActionHandler + 'static) -> Self {
        Self {
            name: name.into(),
            handler: Some(Arc::new(handler)),
        }
    }

    /// The action's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a handler is registered.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn handler(&self) -> Option<&dyn ActionHandler> {
        self.handler.as_deref()
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("handled", &self.handler.is_some())
            .finish()
    }
}

/// One device service: identity, action registry, and locked state.
pub struct Service {
    id: ServiceId,
    service_type: String,
    event_namespace: String,
    actions: Vec<Action>,
    state: Mutex<VariableContainer>,
}

impl Service {
    pub(crate) fn new(
        id: ServiceId,
        service_type: String,
        event_namespace: String,
        actions: Vec<Action>,
        state: VariableContainer,
    ) -> Self {
        Self {
            id,
            service_type,
            event_namespace,
            actions,
            state: Mutex::new(state),
        }
    }

    /// Stable identifier of this service.
    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Service type URN, e.g. `urn:schemas-upnp-org:service:RenderingControl:1`.
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// XML namespace of this service's aggregate event documents.
    pub fn event_namespace(&self) -> &str {
        &self.event_namespace
    }

    /// Find a declared action by name.
    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name() == name)
    }

    /// Names of all declared actions, in declaration order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.actions.iter().map(Action::name)
    }

    /// Number of declared state variables.
    pub fn variable_count(&self) -> usize {
        self.state.lock().count()
    }

    /// Names of all declared state variables, in declaration order.
    pub fn variable_names(&self) -> Vec<String> {
        self.state
            .lock()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Take the service lock. Held across handler invocation, collector
    /// transactions, and snapshot enumeration.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, VariableContainer> {
        self.state.lock()
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.id)
            .field("service_type", &self.service_type)
            .field("actions", &self.actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;
    use variable_store::{ChangeCollector, EventFilter, NotificationSink};

    struct NullSink;

    impl NotificationSink for NullSink {
        fn notify(&self, _: &str, _: &[(String, String)]) {}
        fn accept_subscription(&self, _: &str, _: &str, _: &[(String, String)]) {}
    }

    fn test_service() -> Service {
        let mut vars = VariableContainer::new(ChangeCollector::new(
            "rc",
            "urn:schemas-upnp-org:metadata-1-0/RCS/",
            EventFilter::default(),
            Arc::new(NullSink),
        ));
        vars.register("Volume", "10").unwrap();
        vars.register("Mute", "0").unwrap();

        Service::new(
            ServiceId::new("rc"),
            "urn:schemas-upnp-org:service:RenderingControl:1".to_string(),
            "urn:schemas-upnp-org:metadata-1-0/RCS/".to_string(),
            vec![
                Action::handled("SetVolume", |event: &mut ActionEvent| {
                    let desired = event.argument("DesiredVolume")?.to_string();
                    event.variables_mut().set(0, desired)?;
                    Ok(())
                }),
                Action::new("X_CustomStub"),
            ],
            vars,
        )
    }

    #[test]
    fn test_action_lookup() {
        let service = test_service();

        assert!(service.find_action("SetVolume").is_some());
        assert!(service.find_action("SetVolume").unwrap().has_handler());
        assert!(!service.find_action("X_CustomStub").unwrap().has_handler());
        assert!(service.find_action("Teleport").is_none());
    }

    #[test]
    fn test_metadata_accessors() {
        let service = test_service();

        assert_eq!(service.id().as_str(), "rc");
        assert_eq!(
            service.service_type(),
            "urn:schemas-upnp-org:service:RenderingControl:1"
        );
        assert_eq!(
            service.action_names().collect::<Vec<_>>(),
            vec!["SetVolume", "X_CustomStub"]
        );
        assert_eq!(service.variable_count(), 2);
        assert_eq!(service.variable_names(), vec!["Volume", "Mute"]);
    }

    #[test]
    fn test_function_handlers_register_directly() {
        fn reject(event: &mut ActionEvent) -> Result<()> {
            event.set_error(501, "not today");
            Err(ControlError::HandlerFault {
                code: 501,
                message: "not today".to_string(),
            })
        }

        let action = Action::handled("Reject", reject);
        assert!(action.has_handler());
    }
}
