//! Ordered per-service variable storage
//!
//! Variables are declared once at startup; their declaration order fixes a
//! stable index used by action handlers. Assignments feed the attached
//! [`ChangeCollector`](crate::ChangeCollector) whenever a value actually
//! changes, so batching and eventing come for free with `set`.
//!
//! The container performs no locking of its own. The owning service holds
//! one lock around the container and its collector; any multi-step read or
//! write that must appear atomic happens under that lock.
//!
//! Multi-mutation sequences go through [`VariableContainer::transaction`],
//! whose guard closes the collector bracket on drop. Explicit
//! `start`/`finish` calls on the collector remain available for callers
//! that manage the pairing themselves.

use std::ops::{Deref, DerefMut};

use crate::collector::ChangeCollector;

/// Errors from variable declaration and access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The index does not name a declared variable
    #[error("variable index {index} out of range ({count} variables declared)")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of declared variables
        count: usize,
    },

    /// The name is already declared on this container
    #[error("variable {0:?} is already declared")]
    DuplicateName(String),
}

struct Entry {
    name: String,
    value: String,
}

// ============================================================================
// VariableContainer - declaration-ordered name/value store
// ============================================================================

/// Declaration-ordered store of named state-variable values.
///
/// # Example
///
/// ```rust,ignore
/// let mut vars = VariableContainer::new(collector);
/// let volume = vars.register("Volume", "10")?;
///
/// assert_eq!(vars.value(volume)?, "10");
/// let previous = vars.set(volume, "20")?;   // records the change
/// assert_eq!(previous, "10");
/// ```
pub struct VariableContainer {
    entries: Vec<Entry>,
    collector: ChangeCollector,
}

impl VariableContainer {
    /// Create an empty container feeding `collector`.
    pub fn new(collector: ChangeCollector) -> Self {
        Self {
            entries: Vec::new(),
            collector,
        }
    }

    /// Declare a variable with its initial value, returning its index.
    ///
    /// Declaration is not a change: nothing is recorded in the collector.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        initial: impl Into<String>,
    ) -> Result<usize, StoreError> {
        let name = name.into();
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(StoreError::DuplicateName(name));
        }
        self.entries.push(Entry {
            name,
            value: initial.into(),
        });
        Ok(self.entries.len() - 1)
    }

    /// Current value of the variable at `index`.
    pub fn value(&self, index: usize) -> Result<&str, StoreError> {
        self.entry(index).map(|(_, value)| value)
    }

    /// Name and current value of the variable at `index`.
    pub fn entry(&self, index: usize) -> Result<(&str, &str), StoreError> {
        self.entries
            .get(index)
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
            .ok_or(StoreError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    /// Assign a new value, returning the previous one.
    ///
    /// The change is recorded in the attached collector only when the new
    /// value differs from the current one.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<String, StoreError> {
        let count = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, count })?;

        let value = value.into();
        if entry.value == value {
            return Ok(value);
        }

        let previous = std::mem::replace(&mut entry.value, value);
        self.collector.record(&entry.name, &entry.value);
        Ok(previous)
    }

    /// Index of the variable named `name`, if declared.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Number of declared variables.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variables are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    /// The attached change collector.
    pub fn collector(&self) -> &ChangeCollector {
        &self.collector
    }

    /// Mutable access to the attached change collector.
    pub fn collector_mut(&mut self) -> &mut ChangeCollector {
        &mut self.collector
    }

    /// Open a change transaction that closes itself.
    ///
    /// Mutations through the returned guard land in one batch, flushed when
    /// the guard drops. The drop runs on every exit path, so the
    /// start/finish pairing holds even when the caller panics mid-mutation;
    /// changes recorded before the unwind are still published.
    pub fn transaction(&mut self) -> Transaction<'_> {
        self.collector.start();
        Transaction { container: self }
    }
}

impl std::fmt::Debug for VariableContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableContainer")
            .field("variables", &self.entries.len())
            .field("collector", &self.collector)
            .finish()
    }
}

// ============================================================================
// Transaction - drop-closed collector bracket
// ============================================================================

/// Scoped change transaction over a container.
///
/// Created by [`VariableContainer::transaction`]. Dereferences to the
/// container, so mutations read exactly as they do on the container itself;
/// the collector bracket opened at construction closes when the guard
/// drops.
pub struct Transaction<'a> {
    container: &'a mut VariableContainer,
}

impl Deref for Transaction<'_> {
    type Target = VariableContainer;

    fn deref(&self) -> &VariableContainer {
        self.container
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut VariableContainer {
        self.container
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.container.collector.finish();
    }
}
