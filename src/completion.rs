//! What tasks and recovery handlers hand back, and how it is awaited.
//!
//! Task functions return a [`Completion`], a closed set of three shapes:
//!
//! - [`Completion::Deferred`]: a future resolving to a single value
//! - [`Completion::Stream`]: a stream whose first item is the value
//! - [`Completion::Immediate`]: a value that is already there
//!
//! Before the executor resumes, every shape is normalized into one
//! [`Eventual`]. Tasks must not return `Immediate`; recovery handlers may.

use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

use crate::error::{BoxError, Error};
use crate::table::ResultTable;

/// A single value that will be available later.
pub type Eventual = BoxFuture<'static, Result<Value, BoxError>>;

/// A stream of values of which only the first one is used.
pub type ValueStream = BoxStream<'static, Result<Value, BoxError>>;

/// A stream ended before producing its first item.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stream completed without emitting a value")]
pub struct EmptyStream;

/// Return value of a task or recovery function.
pub enum Completion {
    /// A value available right away.
    Immediate(Value),
    /// A future resolving to the value.
    Deferred(Eventual),
    /// A stream; its first item is the value.
    Stream(ValueStream),
}

impl Completion {
    /// Wrap a value that is already known.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Immediate(value.into())
    }

    /// Wrap a future.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        Self::Deferred(future.boxed())
    }

    /// Wrap a stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Value, BoxError>> + Send + 'static,
    {
        Self::Stream(stream.boxed())
    }

    /// A deferred value that has already resolved.
    pub fn resolved(value: impl Into<Value>) -> Self {
        Self::Deferred(future::ready(Ok(value.into())).boxed())
    }

    /// A deferred value that has already failed.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Deferred(future::ready(Err(error.into())).boxed())
    }

    /// Normalize a task's return value. `None` for `Immediate`.
    pub(crate) fn into_task_eventual(self) -> Option<Eventual> {
        match self {
            Self::Immediate(_) => None,
            Self::Deferred(eventual) => Some(eventual),
            Self::Stream(stream) => Some(first(stream)),
        }
    }

    /// Normalize a recovery handler's return value.
    pub(crate) fn into_recovery_eventual(self) -> Eventual {
        match self {
            Self::Immediate(value) => future::ready(Ok(value)).boxed(),
            Self::Deferred(eventual) => eventual,
            Self::Stream(stream) => first(stream),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::Immediate(_) => "Immediate",
            Self::Deferred(_) => "Deferred",
            Self::Stream(_) => "Stream",
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            other => f.write_str(other.shape()),
        }
    }
}

fn first(mut stream: ValueStream) -> Eventual {
    async move {
        match stream.next().await {
            Some(item) => item,
            None => Err(Box::new(EmptyStream) as BoxError),
        }
    }
    .boxed()
}

/// A task written as a type instead of a closure.
///
/// The task receives a snapshot of the results recorded so far in its
/// sequence. Turn it into an element with [`Element::phunk`](crate::Element::phunk).
#[async_trait::async_trait]
pub trait Phunk: Send + Sync + 'static {
    /// Do the work, producing the value stored under the task's name.
    async fn run(&self, values: &ResultTable) -> Result<Value, BoxError>;
}

/// A recovery handler written as a type instead of a closure.
///
/// Turn it into an element with [`Element::recover_with`](crate::Element::recover_with).
#[async_trait::async_trait]
pub trait Recover: Send + Sync + 'static {
    /// React to the task failure that aborted the sequence.
    async fn recover(&self, error: &Error) -> Result<Value, BoxError>;
}
