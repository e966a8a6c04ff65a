//! The boundary with the host store.

use parking_lot::Mutex;
use serde_json::Value;

/// The store actions are finally dispatched to.
///
/// The middleware sits in front of `dispatch` and only ever hands it plain,
/// fully resolved actions. Whatever `dispatch` returns is passed back
/// unchanged for actions dispatched on their own.
///
/// Any `Fn(Value) -> O` closure is a store.
pub trait Store: Send + Sync {
    /// Value returned by [`Store::dispatch`].
    type Output;

    /// Dispatch a resolved action.
    fn dispatch(&self, action: Value) -> Self::Output;
}

impl<F, O> Store for F
where
    F: Fn(Value) -> O + Send + Sync,
{
    type Output = O;

    fn dispatch(&self, action: Value) -> O {
        self(action)
    }
}

// ============================================================================
// Recording Store
// ============================================================================

/// A store that only remembers what it was sent.
///
/// Dispatch returns the action itself. Useful in tests and demos to check
/// exactly which actions reached the store, and in which order.
#[derive(Debug, Default)]
pub struct RecordingStore {
    actions: Mutex<Vec<Value>>,
}

impl RecordingStore {
    /// Create a store that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action dispatched so far, oldest first.
    pub fn actions(&self) -> Vec<Value> {
        self.actions.lock().clone()
    }

    /// Number of dispatched actions.
    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    /// Whether nothing has been dispatched.
    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// Forget every recorded action.
    pub fn clear(&self) {
        self.actions.lock().clear();
    }
}

impl Store for RecordingStore {
    type Output = Value;

    fn dispatch(&self, action: Value) -> Value {
        self.actions.lock().push(action.clone());
        action
    }
}
