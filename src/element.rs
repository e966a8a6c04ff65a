//! Sequence elements and their classification.
//!
//! An [`Element`] is a bag of named fields plus, optionally, a task function
//! or a recovery function. What it *is* only gets decided by classification:
//!
//! - an element with a task function is a task; it needs a non-empty `name`
//!   and must not have a `type`
//! - otherwise, an element with a recovery function is a recovery handler;
//!   it must not have a `type`
//! - anything else is a plain action
//!
//! Classification fails eagerly on the shapes above that are invalid.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::action::Action;
use crate::async_value::AsyncValue;
use crate::completion::{Completion, Phunk, Recover};
use crate::error::Error;
use crate::table::ResultTable;

/// Field holding an action's type.
pub const TYPE_FIELD: &str = "type";

/// Field holding a task's name.
pub const NAME_FIELD: &str = "name";

/// Work function of a task.
pub type TaskFn = Arc<dyn Fn(&ResultTable) -> Completion + Send + Sync>;

/// Function run when a task in the sequence fails.
pub type RecoveryFn = Arc<dyn Fn(Error) -> Completion + Send + Sync>;

/// The value of one field of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Plain data, forwarded as is.
    Value(Value),
    /// Reference to an earlier task's result.
    Async(AsyncValue),
}

impl Field {
    /// `null`, `false`, `0` and `""` count as absent.
    fn is_present(&self) -> bool {
        match self {
            Self::Async(_) => true,
            Self::Value(Value::Null) => false,
            Self::Value(Value::Bool(b)) => *b,
            Self::Value(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Self::Value(Value::String(s)) => !s.is_empty(),
            Self::Value(Value::Array(_) | Value::Object(_)) => true,
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<AsyncValue> for Field {
    fn from(value: AsyncValue) -> Self {
        Self::Async(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

/// One entry of a dispatched sequence.
#[derive(Clone, Default)]
pub struct Element {
    fields: BTreeMap<String, Field>,
    task: Option<TaskFn>,
    recovery: Option<RecoveryFn>,
}

/// A task that passed classification.
#[derive(Clone)]
pub(crate) struct Task {
    pub(crate) name: Arc<str>,
    pub(crate) work: TaskFn,
}

/// A recovery handler that passed classification.
#[derive(Clone)]
pub(crate) struct Recovery {
    pub(crate) handler: RecoveryFn,
}

/// What an element turned out to be.
pub(crate) enum Kind {
    Action(Action),
    Task(Task),
    Recovery(Recovery),
}

impl Element {
    /// An element with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain action with the given `type`.
    pub fn action(kind: impl Into<String>) -> Self {
        Self::new().with(TYPE_FIELD, kind.into())
    }

    /// A task called `name` running `run`.
    ///
    /// `run` receives the results recorded so far in the sequence.
    pub fn task<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ResultTable) -> Completion + Send + Sync + 'static,
    {
        Self {
            task: Some(Arc::new(run)),
            ..Self::new()
        }
        .with(NAME_FIELD, name.into())
    }

    /// A task called `name` backed by a [`Phunk`] implementation.
    pub fn phunk<P: Phunk>(name: impl Into<String>, phunk: P) -> Self {
        let phunk = Arc::new(phunk);
        Self::task(name, move |values| {
            let phunk = Arc::clone(&phunk);
            let values = values.clone();
            Completion::deferred(async move { phunk.run(&values).await })
        })
    }

    /// A recovery handler running `handler` with the error that failed the sequence.
    pub fn recovery<F>(handler: F) -> Self
    where
        F: Fn(Error) -> Completion + Send + Sync + 'static,
    {
        Self {
            recovery: Some(Arc::new(handler)),
            ..Self::new()
        }
    }

    /// A recovery handler backed by a [`Recover`] implementation.
    pub fn recover_with<R: Recover>(handler: R) -> Self {
        let handler = Arc::new(handler);
        Self::recovery(move |error| {
            let handler = Arc::clone(&handler);
            Completion::deferred(async move { handler.recover(&error).await })
        })
    }

    /// Set a field, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Field>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The field called `key`.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// All fields, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn has(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(Field::is_present)
    }

    fn task_name(&self) -> Option<Arc<str>> {
        match self.fields.get(NAME_FIELD) {
            Some(Field::Value(Value::String(name))) if !name.is_empty() => {
                Some(name.as_str().into())
            }
            _ => None,
        }
    }

    /// Whether this element is a task.
    ///
    /// # Errors
    ///
    /// [`Error::TaskWithType`] or [`Error::TaskWithoutName`] if it has a task
    /// function but an invalid shape.
    pub fn is_task(&self) -> Result<bool, Error> {
        if self.task.is_none() {
            return Ok(false);
        }
        if self.has(TYPE_FIELD) {
            return Err(Error::TaskWithType);
        }
        if self.task_name().is_none() {
            return Err(Error::TaskWithoutName);
        }
        Ok(true)
    }

    /// Whether this element is a recovery handler.
    ///
    /// # Errors
    ///
    /// [`Error::RecoveryWithType`] if it has a recovery function and a `type`.
    pub fn is_recovery(&self) -> Result<bool, Error> {
        if self.recovery.is_none() {
            return Ok(false);
        }
        if self.has(TYPE_FIELD) {
            return Err(Error::RecoveryWithType);
        }
        Ok(true)
    }

    /// Classify as task, then recovery handler, then plain action.
    pub(crate) fn classify(self) -> Result<Kind, Error> {
        if self.is_task()? {
            let name = self.task_name().ok_or(Error::TaskWithoutName)?;
            let work = self.task.ok_or(Error::TaskWithoutName)?;
            return Ok(Kind::Task(Task { name, work }));
        }
        if self.is_recovery()? {
            let handler = self.recovery.ok_or(Error::RecoveryWithType)?;
            return Ok(Kind::Recovery(Recovery { handler }));
        }
        self.into_action().map(Kind::Action)
    }

    /// Treat the element as a plain action, ignoring any functions it holds.
    pub(crate) fn into_action(self) -> Result<Action, Error> {
        if let Some(Field::Async(_)) = self.fields.get(TYPE_FIELD) {
            return Err(Error::AsyncType);
        }
        Ok(Action::new(self.fields))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("fields", &self.fields)
            .field("task", &self.task.is_some())
            .field("recovery", &self.recovery.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_value;
    use serde_json::json;

    fn noop(_: &ResultTable) -> Completion {
        Completion::resolved(Value::Null)
    }

    #[test]
    fn plain_action() {
        let element = Element::action("VANILLA").with("load", "some data");
        assert!(!element.is_task().expect("valid"));
        assert!(!element.is_recovery().expect("valid"));
        assert!(matches!(element.classify(), Ok(Kind::Action(_))));
    }

    #[test]
    fn task_needs_a_name() {
        let element = Element::task("", noop);
        assert!(matches!(element.is_task(), Err(Error::TaskWithoutName)));

        let element = Element::task("x", noop).with(NAME_FIELD, json!(3));
        assert!(matches!(element.is_task(), Err(Error::TaskWithoutName)));
    }

    #[test]
    fn task_may_not_have_a_type() {
        let element = Element::task("user", noop).with(TYPE_FIELD, "FETCH");
        assert!(matches!(element.is_task(), Err(Error::TaskWithType)));
    }

    #[test]
    fn falsy_type_is_absent() {
        for kind in [Value::Null, json!(false), json!(""), json!(0)] {
            let element = Element::task("user", noop).with(TYPE_FIELD, kind.clone());
            assert!(
                element.is_task().expect("falsy type is ignored"),
                "type {kind} should be ignored"
            );

            let element =
                Element::recovery(|_| Completion::value(Value::Null)).with(TYPE_FIELD, kind);
            assert!(element.is_recovery().expect("falsy type is ignored"));
        }

        let element = Element::task("user", noop).with(TYPE_FIELD, json!([]));
        assert!(matches!(element.is_task(), Err(Error::TaskWithType)));
    }

    #[test]
    fn recovery_may_not_have_a_type() {
        let element =
            Element::recovery(|_| Completion::value(Value::Null)).with(TYPE_FIELD, "OOPS");
        assert!(matches!(element.is_recovery(), Err(Error::RecoveryWithType)));
    }

    #[test]
    fn task_takes_precedence() {
        let element = Element {
            recovery: Some(Arc::new(|_: Error| Completion::value(Value::Null))),
            ..Element::task("user", noop)
        };
        match element.classify() {
            Ok(Kind::Task(task)) => assert_eq!(task.name.as_ref(), "user"),
            _ => panic!("Expected a task"),
        }
    }

    #[test]
    fn async_type_is_rejected() {
        let element = Element::new().with(TYPE_FIELD, async_value("theType").expect("name"));
        assert!(matches!(element.classify(), Err(Error::AsyncType)));
    }

    #[test]
    fn plain_action_may_carry_a_name() {
        let element = Element::action("RENAME").with(NAME_FIELD, "bob");
        assert!(matches!(element.classify(), Ok(Kind::Action(_))));
    }
}
