#![deny(missing_docs)]

//! Phunk: ordered sequences of actions and async tasks for
//! unidirectional-data-flow stores.
//!
//! # Design Goals
//!
//! Phunk sits in front of a store's `dispatch` and lets a caller dispatch one
//! list that mixes plain actions with async work:
//!
//! - **Strict order**: tasks run one at a time, in sequence order
//! - **Async values**: a task's result can be referenced by later actions
//! - **Short-circuit**: a failing task stops the sequence; an optional
//!   trailing recovery handler sees the error first
//!
//! # Core Concepts
//!
//! - [`Element`]: an action, a task or a recovery handler
//! - [`async_value`]: a placeholder for an earlier task's result
//! - [`Completion`]: what tasks hand back (deferred value, stream or plain value)
//! - [`Middleware`]: the entry point wrapping a [`Store`]
//! - [`ResultTable`]: task results of one dispatched sequence

// Modules
mod action;
pub mod async_value;
pub mod completion;
pub mod element;
pub mod error;
mod executor;
mod macros;
pub mod middleware;
mod runner;
pub mod sequence;
pub mod store;
pub mod table;

// Re-exports for convenience
pub use async_value::{async_value, AsyncValue};
pub use completion::{Completion, EmptyStream, Eventual, Phunk, Recover, ValueStream};
pub use element::{Element, Field, RecoveryFn, TaskFn, NAME_FIELD, TYPE_FIELD};
pub use error::{BoxError, Error, ErrorKind, SharedError};
pub use middleware::{Config, DispatchId, Dispatched, Middleware, Settlement};
pub use sequence::Dispatch;
pub use store::{RecordingStore, Store};
pub use table::ResultTable;

#[cfg(test)]
mod tests;
