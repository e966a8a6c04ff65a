//! Plain actions: resolving async values and forwarding to the store.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::element::{Field, TYPE_FIELD};
use crate::error::Error;
use crate::store::Store;
use crate::table::ResultTable;

/// A plain action that passed classification.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Action {
    fields: BTreeMap<String, Field>,
}

impl Action {
    pub(crate) fn new(fields: BTreeMap<String, Field>) -> Self {
        Self { fields }
    }

    /// The action's `type`, rendered for messages.
    pub(crate) fn kind(&self) -> String {
        match self.fields.get(TYPE_FIELD) {
            Some(Field::Value(Value::String(kind))) => kind.clone(),
            Some(Field::Value(Value::Null)) | None => "<untyped>".to_string(),
            Some(Field::Value(other)) => other.to_string(),
            Some(Field::Async(value)) => value.to_string(),
        }
    }

    /// Replace every async value with its result from `table`.
    pub(crate) fn resolve(&self, table: &ResultTable) -> Result<Value, Error> {
        if let Some(Field::Async(_)) = self.fields.get(TYPE_FIELD) {
            return Err(Error::AsyncType);
        }

        let mut resolved = Map::new();
        for (key, field) in &self.fields {
            let value = match field {
                Field::Value(value) => value.clone(),
                Field::Async(reference) => table
                    .get(reference.name())
                    .cloned()
                    .ok_or_else(|| Error::UnresolvedReference {
                        name: reference.shared_name(),
                        action_type: self.kind(),
                    })?,
            };
            resolved.insert(key.clone(), value);
        }
        Ok(Value::Object(resolved))
    }

    /// Resolve against `table` and hand the result to `store`.
    ///
    /// Nothing reaches the store if resolution fails.
    pub(crate) fn forward<S: Store>(
        &self,
        store: &S,
        table: &ResultTable,
    ) -> Result<S::Output, Error> {
        let resolved = self.resolve(table)?;
        Ok(store.dispatch(resolved))
    }
}
