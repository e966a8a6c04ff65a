//! Starting tasks and running recovery handlers to completion.

use serde_json::Value;

use crate::completion::Eventual;
use crate::element::{Recovery, Task};
use crate::error::Error;
use crate::table::ResultTable;

/// Invoke `task`'s work function against the results recorded so far.
///
/// The work function runs right away; only its completion is left to be
/// awaited. A task that hands back a plain value fails with
/// [`Error::InvalidTaskReturn`].
pub(crate) fn start_task(task: &Task, table: &ResultTable) -> Result<Eventual, Error> {
    (task.work)(table)
        .into_task_eventual()
        .ok_or_else(|| Error::InvalidTaskReturn(task.name.clone()))
}

/// Wait for a started task to produce its value.
pub(crate) async fn settle_task(
    task: &Task,
    started: Result<Eventual, Error>,
) -> Result<Value, Error> {
    started?
        .await
        .map_err(|source| Error::task(task.name.clone(), source))
}

/// Run the recovery handler for `cause`.
///
/// Unlike tasks, handlers may return a plain value.
pub(crate) async fn run_recovery(recovery: &Recovery, cause: Error) -> Result<Value, Error> {
    (recovery.handler)(cause)
        .into_recovery_eventual()
        .await
        .map_err(Error::recovery)
}
