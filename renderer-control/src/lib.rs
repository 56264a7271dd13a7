//! # renderer-control
//!
//! Device-side control plane for a UPnP AV media renderer: per-service
//! state variables, batched change eventing, and action dispatch.
//!
//! The crate sits between a protocol engine (which decodes SOAP and
//! eventing HTTP) and a playback backend. The engine hands decoded
//! requests to a [`RendererDevice`]; the backend mutates service state
//! through the same device. Every mutation path funnels through a
//! per-service change collector so observers receive one coalesced
//! notification per request, not one per touched variable.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use renderer_control::{ActionEvent, ActionInvocation, NotificationSink, RendererDevice, ServiceConfig};
//!
//! struct ConsoleSink;
//!
//! impl NotificationSink for ConsoleSink {
//!     fn notify(&self, service_id: &str, variables: &[(String, String)]) {
//!         for (name, value) in variables {
//!             println!("{}: {} = {}", service_id, name, value);
//!         }
//!     }
//!
//!     fn accept_subscription(&self, service_id: &str, subscriber_id: &str, variables: &[(String, String)]) {
//!         println!("{} joined {} with {} variable(s)", subscriber_id, service_id, variables.len());
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let device = RendererDevice::builder()
//!         .sink(Arc::new(ConsoleSink))
//!         .service(
//!             ServiceConfig::new(
//!                 "urn:upnp-org:serviceId:RenderingControl",
//!                 "urn:schemas-upnp-org:service:RenderingControl:1",
//!                 "urn:schemas-upnp-org:metadata-1-0/RCS/",
//!             )
//!             .variable("LastChange", "")
//!             .variable("Volume", "50")
//!             .handled_action("SetVolume", |event: &mut ActionEvent| {
//!                 let desired = event.argument("DesiredVolume")?;
//!                 let index = event.variables().index_of("Volume").unwrap();
//!                 event.variables_mut().set(index, desired)?;
//!                 Ok(())
//!             }),
//!         )
//!         .build()?;
//!
//!     let response = device.dispatch_action(
//!         &ActionInvocation::new("urn:upnp-org:serviceId:RenderingControl", "SetVolume")
//!             .with_argument("DesiredVolume", "42"),
//!     )?;
//!     assert!(response.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **One notification per request**: handler mutations are collected and
//!   flushed as a single aggregate event when the action completes
//! - **Fault taxonomy**: every failure carries a numeric SOAP fault code
//!   the protocol engine can frame directly
//! - **Initial-state snapshots**: new subscribers receive the full evented
//!   state atomically, never a half-applied mutation
//! - **Backend parity**: in-process state updates event exactly like
//!   handler mutations
//!
//! ## Architecture
//!
//! ```text
//! renderer-control (dispatch, subscriptions, queries)
//!     ↓
//! variable-store (per-service variables + change collection)
//!     ↓
//! NotificationSink (delivery, implemented by the host)
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod logging;
pub mod service;
pub mod types;

mod registry;

pub use config::ServiceConfig;
pub use device::{DeviceBuilder, RendererDevice};
pub use error::{
    ConfigError, ControlError, Result, FAULT_ACTION_FAILED, FAULT_INVALID_ACTION,
    FAULT_INVALID_ARGS, FAULT_INVALID_VAR,
};
pub use event::ActionEvent;
pub use service::{Action, ActionHandler, Service};
pub use types::{
    ActionInvocation, ActionResponse, ServiceId, StateVariableQuery, SubscriptionRequest,
};

// Re-export the storage-layer types callers wire against.
pub use variable_store::{EventFilter, NotificationSink, StoreError, VariableContainer};
