//! Error types for sequence dispatch.

use std::sync::Arc;

/// Boxed error returned by task and recovery functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared form of [`BoxError`], so [`Error`] stays `Clone`.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The dispatched value has an invalid shape.
    MalformedElement,
    /// An action referenced a task result that does not exist (yet).
    UnresolvedReference,
    /// A task failed or returned something that cannot be awaited.
    TaskFailure,
    /// The recovery handler itself failed.
    RecoveryFailure,
}

/// Errors surfaced by [`Middleware`](crate::Middleware).
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// A task element also carries a `type` field.
    #[error("tasks may not have a type")]
    TaskWithType,

    /// A task element has no usable `name`.
    #[error("tasks must have a non-empty string name")]
    TaskWithoutName,

    /// A recovery element also carries a `type` field.
    #[error("recovery handlers must not have a type")]
    RecoveryWithType,

    /// A recovery handler appears before the end of a sequence.
    #[error("a recovery handler must be the last element of a sequence, found one at position {position} of {len}")]
    MisplacedRecovery {
        /// Position of the offending handler.
        position: usize,
        /// Length of the flattened sequence.
        len: usize,
    },

    /// A task was dispatched on its own instead of inside a sequence.
    #[error("cannot dispatch a task outside of a sequence")]
    LoneTask,

    /// [`async_value`](crate::async_value) was called with an empty name.
    #[error("async values must name a task with a non-empty string")]
    EmptyAsyncValueName,

    /// An action tried to set its `type` from an async value.
    #[error("actions may not set their type to an async value")]
    AsyncType,

    /// Two tasks in one sequence share a name while unique names are enforced.
    #[error("task name '{0}' is used more than once in the sequence")]
    DuplicateTaskName(Arc<str>),

    /// An action references a task result missing from the result table.
    #[error("no such async value '{name}' for action of type '{action_type}'; did you forget a task called '{name}'?")]
    UnresolvedReference {
        /// Name carried by the async value.
        name: Arc<str>,
        /// Rendered `type` of the action holding the reference.
        action_type: String,
    },

    /// A task returned a plain value instead of a deferred value or stream.
    #[error("task '{0}' did not return a deferred value or a stream")]
    InvalidTaskReturn(Arc<str>),

    /// A task's deferred value or stream failed.
    #[error("task '{name}' failed: {source}")]
    Task {
        /// Name of the failed task.
        name: Arc<str>,
        /// Error produced by the task.
        #[source]
        source: SharedError,
    },

    /// The recovery handler failed while handling a task failure.
    #[error("recovery handler failed: {0}")]
    Recovery(#[source] SharedError),
}

impl Error {
    pub(crate) fn task(name: Arc<str>, source: BoxError) -> Self {
        Self::Task {
            name,
            source: Arc::from(source),
        }
    }

    pub(crate) fn recovery(source: BoxError) -> Self {
        Self::Recovery(Arc::from(source))
    }

    /// Which of the four error kinds this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskWithType
            | Self::TaskWithoutName
            | Self::RecoveryWithType
            | Self::MisplacedRecovery { .. }
            | Self::LoneTask
            | Self::EmptyAsyncValueName
            | Self::AsyncType
            | Self::DuplicateTaskName(_) => ErrorKind::MalformedElement,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::Task { .. } | Self::InvalidTaskReturn(_) => ErrorKind::TaskFailure,
            Self::Recovery(_) => ErrorKind::RecoveryFailure,
        }
    }

    /// Returns `true` for shape errors detected before any work starts.
    pub fn is_malformed(&self) -> bool {
        self.kind() == ErrorKind::MalformedElement
    }

    /// Name of the task this error originated from, if any.
    pub fn task_name(&self) -> Option<&str> {
        match self {
            Self::Task { name, .. } | Self::InvalidTaskReturn(name) => Some(name),
            _ => None,
        }
    }
}
