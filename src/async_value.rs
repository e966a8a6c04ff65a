//! References to the eventual result of a named task.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;

/// Placeholder for the value a task produces later in the same sequence.
///
/// An `AsyncValue` can only be built through [`async_value`], which rejects
/// empty names. Place it in an action's field and the middleware swaps in the
/// task's result before the action reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AsyncValue {
    name: Arc<str>,
}

impl AsyncValue {
    /// Name of the task whose result this refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }
}

impl fmt::Display for AsyncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "async value '{}'", self.name)
    }
}

/// Reference the result of the task called `name`.
///
/// # Errors
///
/// Returns [`Error::EmptyAsyncValueName`] if `name` is empty.
pub fn async_value(name: impl AsRef<str>) -> Result<AsyncValue, Error> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(Error::EmptyAsyncValueName);
    }
    Ok(AsyncValue { name: name.into() })
}
