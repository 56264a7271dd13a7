//! Batched change collection with reentrant transactions
//!
//! Every variable mutation inside one action should reach subscribers as a
//! single notification, even when the action triggers further mutations
//! through nested transactions. The collector counts transaction depth with
//! a plain integer: `start()` increments, `finish()` decrements, and the
//! accumulated batch is flushed exactly when the depth returns to zero.
//!
//! Mutations arriving outside any transaction (a playback backend driving
//! the container directly) flush immediately, one notification per change.

use std::sync::Arc;

use crate::builder::LastChangeBuilder;
use crate::filter::EventFilter;
use crate::sink::NotificationSink;

/// Collects variable changes for one service and emits them as aggregate
/// event documents through a [`NotificationSink`].
///
/// The collector is not internally synchronized; the owning service's lock
/// covers it together with the variable container it serves.
pub struct ChangeCollector {
    /// Service the notifications are attributed to
    service_id: String,
    /// XML namespace of the aggregate event document
    namespace: String,
    filter: EventFilter,
    sink: Arc<dyn NotificationSink>,
    /// Open transaction count; flush happens on the 1 -> 0 transition
    depth: u32,
    /// Coalesced pending changes in first-recorded order
    pending: Vec<(String, String)>,
}

impl ChangeCollector {
    /// Create a collector for `service_id`, emitting into `sink`.
    pub fn new(
        service_id: impl Into<String>,
        namespace: impl Into<String>,
        filter: EventFilter,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            namespace: namespace.into(),
            filter,
            sink,
            depth: 0,
            pending: Vec::new(),
        }
    }

    /// Open a transaction. Nested calls are folded into the outermost one.
    pub fn start(&mut self) {
        if self.depth == 0 {
            self.pending.clear();
        }
        self.depth += 1;
        tracing::trace!(
            "collector start on {} (depth now {})",
            self.service_id,
            self.depth
        );
    }

    /// Record one variable change.
    ///
    /// Non-evented names are dropped. Recording the same name twice within
    /// a transaction keeps its first-recorded position but the last value.
    /// Outside any transaction the change is flushed immediately.
    pub fn record(&mut self, name: &str, value: &str) {
        if !self.filter.is_evented(name) {
            tracing::trace!("skipping non-evented variable {} on {}", name, self.service_id);
            return;
        }

        match self.pending.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.pending.push((name.to_string(), value.to_string())),
        }

        if self.depth == 0 {
            self.flush();
        }
    }

    /// Close a transaction, flushing the batch when the outermost one ends.
    ///
    /// A `finish()` without a matching `start()` is a caller bug; the depth
    /// saturates at zero rather than wrapping.
    pub fn finish(&mut self) {
        if self.depth == 0 {
            tracing::warn!(
                "collector finish without matching start on {}",
                self.service_id
            );
            return;
        }
        self.depth -= 1;
        tracing::trace!(
            "collector finish on {} (depth now {})",
            self.service_id,
            self.depth
        );
        if self.depth == 0 {
            self.flush();
        }
    }

    /// Current transaction depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of changes waiting for the outermost `finish()`.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The filter deciding which names are evented.
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// XML namespace of the aggregate event document.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Serialize the pending batch and emit it as one notification.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let mut builder = LastChangeBuilder::new(self.namespace.as_str());
        for (name, value) in &self.pending {
            builder.add(name, value);
        }
        let document = builder.build();

        tracing::debug!(
            "notifying {} changed variable(s) on {}",
            self.pending.len(),
            self.service_id
        );
        let update = [(self.filter.aggregate_name().to_string(), document)];
        self.sink.notify(&self.service_id, &update);
        self.pending.clear();
    }
}

impl std::fmt::Debug for ChangeCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCollector")
            .field("service_id", &self.service_id)
            .field("depth", &self.depth)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every notification for assertions.
    #[derive(Default)]
    struct RecordingSink {
        notifications: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl RecordingSink {
        fn notifications(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.notifications.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, service_id: &str, variables: &[(String, String)]) {
            self.notifications
                .lock()
                .unwrap()
                .push((service_id.to_string(), variables.to_vec()));
        }

        fn accept_subscription(&self, _: &str, _: &str, _: &[(String, String)]) {}
    }

    fn collector(sink: &Arc<RecordingSink>) -> ChangeCollector {
        ChangeCollector::new(
            "rc",
            "urn:schemas-upnp-org:metadata-1-0/RCS/",
            EventFilter::default(),
            Arc::clone(sink) as Arc<dyn NotificationSink>,
        )
    }

    #[test]
    fn test_flush_on_outermost_finish() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.record("Volume", "20");
        collector.record("Mute", "1");
        assert!(sink.notifications().is_empty());

        collector.finish();
        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);

        let (service_id, variables) = &notifications[0];
        assert_eq!(service_id, "rc");
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].0, "LastChange");
        assert!(variables[0].1.contains("<Volume val=\"20\"/>"));
        assert!(variables[0].1.contains("<Mute val=\"1\"/>"));
    }

    #[test]
    fn test_nested_transactions_fold_into_one_notification() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.record("Volume", "20");
        collector.start();
        collector.record("Mute", "1");
        collector.finish();
        // Inner finish must not flush
        assert!(sink.notifications().is_empty());
        collector.finish();

        assert_eq!(sink.notifications().len(), 1);
        assert_eq!(collector.depth(), 0);
    }

    #[test]
    fn test_last_value_wins_in_first_recorded_position() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.record("Volume", "20");
        collector.record("Mute", "1");
        collector.record("Volume", "30");
        collector.finish();

        let notifications = sink.notifications();
        let document = &notifications[0].1[0].1;
        assert!(!document.contains("val=\"20\""));
        // Volume keeps its original position ahead of Mute
        let volume_at = document.find("<Volume val=\"30\"/>").unwrap();
        let mute_at = document.find("<Mute val=\"1\"/>").unwrap();
        assert!(volume_at < mute_at);
    }

    #[test]
    fn test_record_outside_transaction_flushes_immediately() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.record("Volume", "20");
        collector.record("Volume", "25");

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 2);
        assert!(notifications[0].1[0].1.contains("val=\"20\""));
        assert!(notifications[1].1[0].1.contains("val=\"25\""));
        assert_eq!(collector.pending_count(), 0);
    }

    #[test]
    fn test_empty_transaction_emits_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.finish();

        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn test_non_evented_names_are_dropped() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.record("LastChange", "<Event/>");
        collector.record("A_ARG_TYPE_Channel", "Master");
        collector.finish();

        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn test_unbalanced_finish_saturates() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.finish();
        assert_eq!(collector.depth(), 0);

        // Later transactions are unaffected
        collector.start();
        collector.record("Volume", "20");
        collector.finish();
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn test_batch_cleared_between_transactions() {
        let sink = Arc::new(RecordingSink::default());
        let mut collector = collector(&sink);

        collector.start();
        collector.record("Volume", "20");
        collector.finish();

        collector.start();
        collector.record("Mute", "1");
        collector.finish();

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 2);
        // The second notification must not replay the first batch
        assert!(!notifications[1].1[0].1.contains("Volume"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const NAMES: [&str; 3] = ["Volume", "Mute", "Treble"];

        proptest! {
            /// Any write sequence inside one transaction flushes each name at
            /// most once, carrying the last value written for it.
            #[test]
            fn prop_batch_coalesces_to_final_values(
                writes in proptest::collection::vec((0usize..3, 0u8..100), 1..32)
            ) {
                let sink = Arc::new(RecordingSink::default());
                let mut collector = ChangeCollector::new(
                    "rc",
                    "urn:schemas-upnp-org:metadata-1-0/RCS/",
                    EventFilter::default(),
                    Arc::clone(&sink) as Arc<dyn NotificationSink>,
                );

                collector.start();
                let mut last = std::collections::HashMap::new();
                for (index, value) in &writes {
                    let name = NAMES[*index];
                    let value = value.to_string();
                    collector.record(name, &value);
                    last.insert(name, value);
                }
                collector.finish();

                let notifications = sink.notifications();
                prop_assert_eq!(notifications.len(), 1);
                let document = &notifications[0].1[0].1;
                for (name, value) in &last {
                    let element = format!("<{} val=\"{}\"/>", name, value);
                    prop_assert!(document.contains(&element));
                    prop_assert_eq!(document.matches(&format!("<{} ", name)).count(), 1);
                }
            }
        }
    }
}
