//! Per-Service State Variables with Batched Change Collection
//!
//! Device-side building blocks for UPnP-style eventing: an ordered store of
//! named state variables whose mutations are collected, coalesced, and
//! emitted as a single aggregate event document per transaction.
//!
//! # Features
//!
//! - **Declaration-ordered Storage**: Variables keep a stable index fixed at
//!   startup
//! - **Change Detection**: Only assignments that change a value are collected
//! - **Reentrant Batching**: Nested start/finish transactions fold into one
//!   notification
//! - **Evented-name Filtering**: Aggregate and `A_ARG_TYPE_` names never
//!   self-event
//! - **Transport-agnostic Delivery**: Notifications leave through a trait
//!   boundary
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use variable_store::{ChangeCollector, EventFilter, NotificationSink, VariableContainer};
//!
//! struct NullSink;
//!
//! impl NotificationSink for NullSink {
//!     fn notify(&self, _: &str, _: &[(String, String)]) {}
//!     fn accept_subscription(&self, _: &str, _: &str, _: &[(String, String)]) {}
//! }
//!
//! let collector = ChangeCollector::new(
//!     "RenderingControl",
//!     "urn:schemas-upnp-org:metadata-1-0/RCS/",
//!     EventFilter::default(),
//!     Arc::new(NullSink),
//! );
//! let mut vars = VariableContainer::new(collector);
//! let volume = vars.register("Volume", "10").unwrap();
//!
//! // One transaction -> at most one notification
//! vars.collector_mut().start();
//! vars.set(volume, "20").unwrap();
//! vars.collector_mut().finish();
//!
//! assert_eq!(vars.value(volume).unwrap(), "20");
//! ```
//!
//! # Architecture
//!
//! ```text
//! VariableContainer
//!     │   set(index, value) -> previous
//!     ├── entries: [(name, value)]         declaration order = index
//!     │
//!     └── ChangeCollector                  one per service, lock-covered
//!             │   start / record / finish
//!             ├── EventFilter              aggregate + silent-prefix rules
//!             ├── pending: [(name, value)] coalesced batch
//!             ├── LastChangeBuilder        <Event><InstanceID val="0">…
//!             │
//!             └── NotificationSink         transport boundary
//! ```

// Modules
pub mod builder;
pub mod collector;
pub mod container;
pub mod filter;
pub mod sink;

// Re-exports - Public API
pub use builder::LastChangeBuilder;
pub use collector::ChangeCollector;
pub use container::{StoreError, Transaction, VariableContainer};
pub use filter::EventFilter;
pub use sink::NotificationSink;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::LastChangeBuilder;
    pub use crate::collector::ChangeCollector;
    pub use crate::container::{StoreError, Transaction, VariableContainer};
    pub use crate::filter::EventFilter;
    pub use crate::sink::NotificationSink;
}
