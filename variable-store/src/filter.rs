//! Evented-variable filtering rules
//!
//! UPnP services reserve one variable name for the aggregate change event
//! itself and mark pure argument-type variables with a name prefix so they
//! are never evented. Both rules are naming conventions, so they live here
//! as configuration rather than hard-coded string matching.

/// Decides which variable names participate in change eventing.
///
/// A name is *evented* when it is neither the reserved aggregate-event
/// name nor prefixed by any of the configured silent prefixes.
///
/// # Example
///
/// ```rust
/// use variable_store::EventFilter;
///
/// let filter = EventFilter::default();
/// assert!(filter.is_evented("Volume"));
/// assert!(!filter.is_evented("LastChange"));
/// assert!(!filter.is_evented("A_ARG_TYPE_InstanceID"));
/// ```
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Reserved name of the aggregate change variable
    aggregate_name: String,
    /// Name prefixes that mark a variable as never evented
    silent_prefixes: Vec<String>,
}

impl EventFilter {
    /// Create a filter with an explicit aggregate name and silent prefixes.
    pub fn new(
        aggregate_name: impl Into<String>,
        silent_prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            aggregate_name: aggregate_name.into(),
            silent_prefixes: silent_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add another silent prefix to the filter.
    pub fn with_silent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.silent_prefixes.push(prefix.into());
        self
    }

    /// Name of the reserved aggregate change variable.
    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    /// Whether changes to `name` should be collected and evented.
    pub fn is_evented(&self, name: &str) -> bool {
        if name == self.aggregate_name {
            return false;
        }
        !self
            .silent_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Default for EventFilter {
    /// The standard UPnP AV convention: `LastChange` carries the aggregate
    /// event and `A_ARG_TYPE_`-prefixed variables are never evented.
    fn default() -> Self {
        Self::new("LastChange", ["A_ARG_TYPE_"])
    }
}
