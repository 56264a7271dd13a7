//! Error types for the renderer-control crate.
//!
//! Two taxonomies with no overlap: [`ControlError`] is the per-request
//! fault channel returned to the protocol engine, [`ConfigError`] reports
//! startup misconfiguration and never crosses the dispatch boundary.

use variable_store::StoreError;

/// SOAP fault: the requested action is not supported by the service.
pub const FAULT_INVALID_ACTION: u32 = 401;
/// SOAP fault: an action argument is missing or invalid.
pub const FAULT_INVALID_ARGS: u32 = 402;
/// SOAP fault: the queried state variable does not exist.
pub const FAULT_INVALID_VAR: u32 = 404;
/// SOAP fault: the action handler reported a failure.
pub const FAULT_ACTION_FAILED: u32 = 501;

/// Faults returned to the protocol engine for a single request.
///
/// Every variant maps to a numeric SOAP fault code via
/// [`fault_code`](ControlError::fault_code); the `Display` text is the
/// fault message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// No service with the requested ID is registered
    #[error("unknown service {0}")]
    ServiceNotFound(String),

    /// The service does not declare the requested action
    #[error("unknown action '{action}' for service '{service}'")]
    ActionNotFound {
        /// Service the request was addressed to
        service: String,
        /// The unrecognized action name
        action: String,
    },

    /// The service does not declare the queried variable
    #[error("no variable named '{name}' on service '{service}'")]
    InvalidVariable {
        /// Service the query was addressed to
        service: String,
        /// The unrecognized variable name
        name: String,
    },

    /// A required action argument was not supplied
    #[error("Missing action request argument ({0})")]
    MissingArgument(String),

    /// The action handler declared a failure with its own code and message
    #[error("{message}")]
    HandlerFault {
        /// Handler-chosen fault code
        code: u32,
        /// Handler-chosen fault message
        message: String,
    },

    /// A response argument was added after the action had already faulted
    #[error("response already finalized by a fault")]
    ResponseAlreadyFinalized,
}

impl ControlError {
    /// The numeric SOAP fault code for this error.
    pub fn fault_code(&self) -> u32 {
        match self {
            ControlError::ServiceNotFound(_) => FAULT_INVALID_ACTION,
            ControlError::ActionNotFound { .. } => FAULT_INVALID_ACTION,
            ControlError::InvalidVariable { .. } => FAULT_INVALID_VAR,
            ControlError::MissingArgument(_) => FAULT_INVALID_ARGS,
            ControlError::HandlerFault { code, .. } => *code,
            ControlError::ResponseAlreadyFinalized => FAULT_ACTION_FAILED,
        }
    }
}

/// Container misuse inside a handler surfaces as an action failure, not a
/// crash of the dispatch loop.
impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        ControlError::HandlerFault {
            code: FAULT_ACTION_FAILED,
            message: err.to_string(),
        }
    }
}

/// Errors found while assembling a device from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two services were configured with the same ID
    #[error("duplicate service id: {0}")]
    DuplicateService(String),

    /// A variable name appears twice on one service
    #[error("duplicate variable '{name}' on service '{service}'")]
    DuplicateVariable {
        /// The offending service
        service: String,
        /// The duplicated variable name
        name: String,
    },

    /// An action name appears twice on one service
    #[error("duplicate action '{name}' on service '{service}'")]
    DuplicateAction {
        /// The offending service
        service: String,
        /// The duplicated action name
        name: String,
    },

    /// A required identifier was left empty
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    /// The device was built without a notification sink
    #[error("no notification sink configured")]
    MissingSink,
}

/// Convenience type alias for Results using ControlError.
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_control_error_display() {
        let error = ControlError::ServiceNotFound("urn:upnp-org:serviceId:Nope".to_string());
        assert_eq!(error.to_string(), "unknown service urn:upnp-org:serviceId:Nope");

        let error = ControlError::ActionNotFound {
            service: "rc".to_string(),
            action: "Teleport".to_string(),
        };
        assert_eq!(error.to_string(), "unknown action 'Teleport' for service 'rc'");

        let error = ControlError::MissingArgument("DesiredVolume".to_string());
        assert_eq!(
            error.to_string(),
            "Missing action request argument (DesiredVolume)"
        );

        let error = ControlError::HandlerFault {
            code: 718,
            message: "Invalid InstanceID".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid InstanceID");
    }

    #[rstest]
    #[case(ControlError::ServiceNotFound("x".into()), FAULT_INVALID_ACTION)]
    #[case(ControlError::ActionNotFound { service: "x".into(), action: "y".into() }, FAULT_INVALID_ACTION)]
    #[case(ControlError::InvalidVariable { service: "x".into(), name: "y".into() }, FAULT_INVALID_VAR)]
    #[case(ControlError::MissingArgument("y".into()), FAULT_INVALID_ARGS)]
    #[case(ControlError::HandlerFault { code: 718, message: "m".into() }, 718)]
    #[case(ControlError::ResponseAlreadyFinalized, FAULT_ACTION_FAILED)]
    fn test_fault_code_mapping(#[case] error: ControlError, #[case] expected: u32) {
        assert_eq!(error.fault_code(), expected);
    }

    #[test]
    fn test_store_error_becomes_action_failure() {
        let store_error = StoreError::IndexOutOfRange { index: 7, count: 2 };
        let error: ControlError = store_error.into();

        assert_eq!(error.fault_code(), FAULT_ACTION_FAILED);
        assert!(error.to_string().contains("variable index 7"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::DuplicateService("rc".to_string());
        assert_eq!(error.to_string(), "duplicate service id: rc");

        let error = ConfigError::DuplicateVariable {
            service: "rc".to_string(),
            name: "Volume".to_string(),
        };
        assert_eq!(error.to_string(), "duplicate variable 'Volume' on service 'rc'");

        let error = ConfigError::EmptyIdentifier("service id");
        assert_eq!(error.to_string(), "service id must not be empty");

        assert_eq!(
            ConfigError::MissingSink.to_string(),
            "no notification sink configured"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn faulting() -> Result<()> {
            Err(ControlError::ResponseAlreadyFinalized)
        }

        assert_eq!(faulting().unwrap_err().fault_code(), FAULT_ACTION_FAILED);
    }
}
