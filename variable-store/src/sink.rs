//! Outbound notification boundary
//!
//! The store batches and serializes variable changes but never talks to the
//! network itself. Delivery goes through the [`NotificationSink`] trait,
//! implemented by the transport layer (or by a recording double in tests).

/// Receives change notifications and initial subscription snapshots.
///
/// Implementations are called while the owning service's lock is held, so
/// they must hand the payload off (queue it, write it, print it) without
/// calling back into the service that produced it. Blocking in a sink
/// blocks every other request for the same service.
pub trait NotificationSink: Send + Sync {
    /// Deliver a batch of changed variables to all current subscribers
    /// of `service_id`.
    ///
    /// Called exactly once per collector flush. For aggregate-evented
    /// services `variables` holds a single entry: the aggregate variable
    /// name and its XML document value.
    fn notify(&self, service_id: &str, variables: &[(String, String)]);

    /// Deliver the initial full-state snapshot to one new subscriber.
    ///
    /// Called exactly once per accepted subscription, before any
    /// subsequent `notify` for that subscriber can be observed.
    fn accept_subscription(
        &self,
        service_id: &str,
        subscriber_id: &str,
        variables: &[(String, String)],
    );
}
