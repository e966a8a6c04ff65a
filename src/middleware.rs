//! The dispatch entry point placed in front of a store.

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::Element;
use crate::error::Error;
use crate::executor::Executor;
use crate::sequence::{Dispatch, Sequence};
use crate::store::Store;
use crate::table::ResultTable;

/// Unique identifier for one dispatched sequence.
///
/// Every log event emitted while the sequence runs carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub Uuid);

impl DispatchId {
    /// Create a new random dispatch ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reject sequences in which two tasks share a name.
    ///
    /// Off by default: a later task silently replaces an earlier result.
    pub unique_task_names: bool,
}

impl Config {
    /// Set [`Config::unique_task_names`].
    pub const fn with_unique_task_names(mut self, unique: bool) -> Self {
        self.unique_task_names = unique;
        self
    }
}

/// Future settling once a dispatched sequence completes or fails.
pub type Settlement<'a> = BoxFuture<'a, Result<ResultTable, Error>>;

/// Outcome of [`Middleware::dispatch`].
pub enum Dispatched<'a, O> {
    /// A lone action went straight to the store; this is what it returned.
    Forwarded(O),
    /// A sequence is running.
    Pending {
        /// Identifier carried by the sequence's log events.
        id: DispatchId,
        /// Resolves to the result table, or to the error that ended the sequence.
        settlement: Settlement<'a>,
    },
}

impl<'a, O> Dispatched<'a, O> {
    /// Returns `true` if a sequence is running.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The store's return value, for a lone action.
    pub fn into_forwarded(self) -> Option<O> {
        match self {
            Self::Forwarded(output) => Some(output),
            Self::Pending { .. } => None,
        }
    }

    /// The settlement future, for a sequence.
    pub fn into_settlement(self) -> Option<Settlement<'a>> {
        match self {
            Self::Forwarded(_) => None,
            Self::Pending { settlement, .. } => Some(settlement),
        }
    }
}

impl<O: fmt::Debug> fmt::Debug for Dispatched<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forwarded(output) => f.debug_tuple("Forwarded").field(output).finish(),
            Self::Pending { id, .. } => f.debug_struct("Pending").field("id", id).finish(),
        }
    }
}

/// Sits in front of a store and runs dispatched sequences.
///
/// # Example
///
/// ```
/// use phunk::{async_value, Completion, Element, Middleware, RecordingStore, ResultTable};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let middleware = Middleware::new(RecordingStore::new());
///
/// let values = middleware
///     .dispatch_sequence(vec![
///         Element::action("GETTING_USER"),
///         Element::task("user", |_: &ResultTable| {
///             Completion::deferred(async { Ok(json!({"id": 1})) })
///         }),
///         Element::action("GOT_USER").with("user", async_value("user")?),
///     ])
///     .await?;
///
/// assert_eq!(values.get("user"), Some(&json!({"id": 1})));
/// assert_eq!(
///     middleware.store().actions(),
///     vec![
///         json!({"type": "GETTING_USER"}),
///         json!({"type": "GOT_USER", "user": {"id": 1}}),
///     ]
/// );
/// # Ok::<(), phunk::Error>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct Middleware<S> {
    store: S,
    config: Config,
}

impl<S: Store> Middleware<S> {
    /// Wrap `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, Config::default())
    }

    /// Wrap `store` with `config`.
    pub fn with_config(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unwrap the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Dispatch a lone action or a sequence.
    ///
    /// A list is flattened and validated, then every action up to its first
    /// task is dispatched and that task is started before this returns. The
    /// [`Dispatched::Pending`] settlement resumes the sequence as tasks
    /// complete. Anything else goes through [`Middleware::dispatch_action`].
    ///
    /// # Errors
    ///
    /// Shape errors are returned immediately, before anything reaches the
    /// store. Failures while running a sequence surface through its
    /// settlement instead.
    pub fn dispatch(
        &self,
        dispatch: impl Into<Dispatch>,
    ) -> Result<Dispatched<'_, S::Output>, Error> {
        match dispatch.into() {
            Dispatch::One(element) => self.dispatch_action(element).map(Dispatched::Forwarded),
            many @ Dispatch::Many(_) => {
                let (id, executor) = self.prepare(many.flatten())?;
                Ok(Dispatched::Pending {
                    id,
                    settlement: executor.start(),
                })
            }
        }
    }

    /// Dispatch a single action, returning whatever the store returns.
    ///
    /// # Errors
    ///
    /// - [`Error::LoneTask`] for a task; its function is never called
    /// - [`Error::UnresolvedReference`] if the action holds any async value,
    ///   since no task has run
    /// - [`Error::AsyncType`] if its `type` is an async value
    pub fn dispatch_action(&self, element: Element) -> Result<S::Output, Error> {
        if element.is_task()? {
            return Err(Error::LoneTask);
        }

        let action = element.into_action()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(action = %action.kind(), "action.dispatch");

        action.forward(&self.store, &ResultTable::new())
    }

    /// Dispatch a sequence and wait for it to settle.
    ///
    /// # Errors
    ///
    /// Any shape error, unresolved async value, task failure or recovery
    /// failure.
    pub async fn dispatch_sequence<T>(&self, elements: Vec<T>) -> Result<ResultTable, Error>
    where
        T: Into<Dispatch>,
    {
        let (_, executor) = self.prepare(Dispatch::from(elements).flatten())?;
        executor.start().await
    }

    fn prepare(&self, elements: Vec<Element>) -> Result<(DispatchId, Executor<'_, S>), Error> {
        let sequence = Sequence::new(elements, &self.config)?;
        let id = DispatchId::new();
        Ok((id, Executor::new(&self.store, sequence, id)))
    }
}
