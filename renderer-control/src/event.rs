//! Per-invocation action context
//!
//! An [`ActionEvent`] lives for exactly one dispatched action. It gives the
//! handler a view of the decoded request, mutable access to the service's
//! variables (the service lock is already held), and the response/fault
//! channel. Once a fault is recorded the event stays failed: later response
//! arguments are rejected and the fault wins over a handler's `Ok` return.

use variable_store::VariableContainer;

use crate::error::{ControlError, Result};
use crate::types::{ActionInvocation, ActionResponse, ServiceId};

/// Mutable context handed to an action handler for one invocation.
pub struct ActionEvent<'a> {
    invocation: &'a ActionInvocation,
    service_id: &'a ServiceId,
    service_type: &'a str,
    variables: &'a mut VariableContainer,
    response: Vec<(String, String)>,
    fault: Option<ControlError>,
}

impl<'a> ActionEvent<'a> {
    pub(crate) fn new(
        invocation: &'a ActionInvocation,
        service_id: &'a ServiceId,
        service_type: &'a str,
        variables: &'a mut VariableContainer,
    ) -> Self {
        Self {
            invocation,
            service_id,
            service_type,
            variables,
            response: Vec::new(),
            fault: None,
        }
    }

    /// Name of the action being invoked.
    pub fn action_name(&self) -> &str {
        &self.invocation.action_name
    }

    /// Service the action is running on.
    pub fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Look up a required inbound argument.
    ///
    /// A missing argument records a [`ControlError::MissingArgument`] fault
    /// on the event and returns it, so a handler can simply `?` its way
    /// through argument extraction.
    pub fn argument(&mut self, name: &str) -> Result<&'a str> {
        match self.invocation.argument(name) {
            Some(value) => Ok(value),
            None => {
                let fault = ControlError::MissingArgument(name.to_string());
                self.set_fault(fault.clone());
                Err(fault)
            }
        }
    }

    /// Look up an optional inbound argument without faulting.
    pub fn optional_argument(&self, name: &str) -> Option<&'a str> {
        self.invocation.argument(name)
    }

    /// The service's variables; the service lock is held for the whole
    /// invocation, so reads and writes here are atomic with the response.
    pub fn variables(&self) -> &VariableContainer {
        self.variables
    }

    /// Mutable access to the service's variables. Assignments feed the
    /// change collector and are published when the dispatch transaction
    /// closes.
    pub fn variables_mut(&mut self) -> &mut VariableContainer {
        self.variables
    }

    /// Append one outbound response argument.
    ///
    /// Rejected with [`ControlError::ResponseAlreadyFinalized`] once the
    /// event has faulted.
    pub fn add_response(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        if self.fault.is_some() {
            return Err(ControlError::ResponseAlreadyFinalized);
        }
        self.response.push((key.into(), value.into()));
        Ok(())
    }

    /// Append the current value of the variable at `index` to the response
    /// under `key`.
    pub fn append_variable(&mut self, index: usize, key: impl Into<String>) -> Result<()> {
        let value = self
            .variables
            .value(index)
            .map_err(ControlError::from)?
            .to_string();
        self.add_response(key, value)
    }

    /// Declare the action failed with a service-specific fault.
    ///
    /// Overwrites any earlier fault; the last error reported describes the
    /// failure. The fault wins even when the handler then returns `Ok`.
    pub fn set_error(&mut self, code: u32, message: impl Into<String>) {
        self.set_fault(ControlError::HandlerFault {
            code,
            message: message.into(),
        });
    }

    /// Whether a fault has been recorded.
    pub fn failed(&self) -> bool {
        self.fault.is_some()
    }

    /// The recorded fault, if any.
    pub fn fault(&self) -> Option<&ControlError> {
        self.fault.as_ref()
    }

    /// Record a fault propagated from the handler's return value without
    /// displacing one the handler already reported itself.
    pub(crate) fn record_fault(&mut self, fault: ControlError) {
        if self.fault.is_none() {
            self.set_fault(fault);
        }
    }

    /// The invocation outcome: the recorded fault, or the accumulated
    /// response (possibly empty) framed with action name and service type.
    pub(crate) fn into_result(self) -> Result<ActionResponse> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(ActionResponse {
                action: self.invocation.action_name.clone(),
                service_type: self.service_type.to_string(),
                arguments: self.response,
            }),
        }
    }

    fn set_fault(&mut self, fault: ControlError) {
        tracing::error!(
            "action {} on {} failed with code {}: {}",
            self.invocation.action_name,
            self.service_id,
            fault.fault_code(),
            fault
        );
        self.fault = Some(fault);
    }
}

impl std::fmt::Debug for ActionEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEvent")
            .field("action", &self.invocation.action_name)
            .field("service_id", &self.service_id)
            .field("response_arguments", &self.response.len())
            .field("failed", &self.fault.is_some())
            .finish()
    }
}
