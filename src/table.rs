//! Per-dispatch table of task results.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Results of the tasks that have settled so far, keyed by task name.
///
/// A fresh table is created for every dispatched sequence and handed back to
/// the caller once the sequence completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    values: HashMap<Arc<str>, Value>,
}

impl ResultTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the task called `name`, if it has settled.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether the task called `name` has a recorded result.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Record a task result, returning the value it replaced.
    pub(crate) fn insert(&mut self, name: Arc<str>, value: Value) -> Option<Value> {
        self.values.insert(name, value)
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no task has settled yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(task name, result)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Render the table as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}
