//! The sequence executor.
//!
//! The executor walks a validated [`Sequence`] front to back:
//!
//! - **Running**: plain actions are resolved and dispatched inline
//! - **Suspended**: at a task, its work function is invoked and the walk
//!   stops until it settles; on success its value is recorded and the walk
//!   resumes with the remainder
//! - **Settled**: the end of the sequence yields the result table; a task
//!   failure runs the trailing recovery handler (if any) and yields an error
//!
//! [`Executor::start`] walks eagerly up to the first task before handing
//! back the settlement, so leading actions reach the store even if the
//! settlement is never awaited. Actions already dispatched are never
//! dispatched again, and at most one task is in flight at any time.

use std::collections::VecDeque;

use futures::future::{self, FutureExt};

use crate::completion::Eventual;
use crate::element::{Recovery, Task};
use crate::error::Error;
use crate::middleware::{DispatchId, Settlement};
use crate::runner::{run_recovery, settle_task, start_task};
use crate::sequence::{Sequence, Step};
use crate::store::Store;
use crate::table::ResultTable;

/// A task whose work function has been invoked.
struct InFlight {
    task: Task,
    started: Result<Eventual, Error>,
}

/// Where the forward walk stopped.
enum Walk {
    /// Reached a task; the walk resumes once it settles.
    Suspended(InFlight),
    /// Ran out of steps.
    Finished,
}

/// Runs one dispatched sequence against a store.
pub(crate) struct Executor<'s, S> {
    store: &'s S,
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    id: DispatchId,
    remaining: VecDeque<Step>,
    recovery: Option<Recovery>,
    table: ResultTable,
    /// Position of the next step in the flattened sequence.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    position: usize,
}

impl<'s, S: Store> Executor<'s, S> {
    pub(crate) fn new(store: &'s S, sequence: Sequence, id: DispatchId) -> Self {
        Self {
            store,
            id,
            remaining: sequence.steps.into(),
            recovery: sequence.recovery,
            table: ResultTable::new(),
            position: 0,
        }
    }

    /// Dispatch every action up to the first task and start that task.
    ///
    /// The returned settlement only waits for in-flight work and resumes
    /// the walk after it. A sequence without tasks is fully dispatched by
    /// the time this returns.
    pub(crate) fn start(mut self) -> Settlement<'s> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            dispatch = %self.id,
            steps = self.remaining.len(),
            recovery = self.recovery.is_some(),
            "sequence.start"
        );

        match self.walk() {
            Ok(Walk::Suspended(in_flight)) => self.resume(in_flight).boxed(),
            Ok(Walk::Finished) => future::ready(self.settle(Ok(()))).boxed(),
            Err(e) => future::ready(self.settle(Err(e))).boxed(),
        }
    }

    /// Wait for `in_flight`, then keep walking until the sequence settles.
    async fn resume(mut self, mut in_flight: InFlight) -> Result<ResultTable, Error> {
        let outcome = loop {
            let InFlight { task, started } = in_flight;

            match settle_task(&task, started).await {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        dispatch = %self.id,
                        step = self.position,
                        task = %task.name,
                        outcome = "ok",
                        "task.end"
                    );

                    self.table.insert(task.name, value);
                    self.position += 1;
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        dispatch = %self.id,
                        step = self.position,
                        task = %task.name,
                        error = %e,
                        outcome = "failed",
                        "task.end"
                    );

                    break Err(self.recover(e).await);
                }
            }

            in_flight = match self.walk() {
                Ok(Walk::Suspended(next)) => next,
                Ok(Walk::Finished) => break Ok(()),
                Err(e) => break Err(e),
            };
        };

        self.settle(outcome)
    }

    /// Dispatch actions until a task is reached and started, or the steps
    /// run out.
    fn walk(&mut self) -> Result<Walk, Error> {
        while let Some(step) = self.remaining.pop_front() {
            match step {
                Step::Action(action) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        dispatch = %self.id,
                        step = self.position,
                        action = %action.kind(),
                        "action.dispatch"
                    );

                    action.forward(self.store, &self.table)?;
                    self.position += 1;
                }
                Step::Task(task) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        dispatch = %self.id,
                        step = self.position,
                        task = %task.name,
                        "task.start"
                    );

                    let started = start_task(&task, &self.table);
                    return Ok(Walk::Suspended(InFlight { task, started }));
                }
            }
        }
        Ok(Walk::Finished)
    }

    /// Hand a task failure to the recovery handler, if there is one.
    ///
    /// The sequence fails either way: with the original error when the
    /// handler succeeds, with the handler's error when it does not.
    /// Unresolved async values never reach this point, so they skip the
    /// handler even though it is present.
    async fn recover(&mut self, cause: Error) -> Error {
        let Some(recovery) = self.recovery.take() else {
            return cause;
        };

        #[cfg(feature = "tracing")]
        tracing::info!(dispatch = %self.id, "recovery.start");

        match run_recovery(&recovery, cause.clone()).await {
            Ok(_) => {
                #[cfg(feature = "tracing")]
                tracing::info!(dispatch = %self.id, outcome = "ok", "recovery.end");

                cause
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(
                    dispatch = %self.id,
                    error = %e,
                    outcome = "failed",
                    "recovery.end"
                );

                e
            }
        }
    }

    fn settle(self, outcome: Result<(), Error>) -> Result<ResultTable, Error> {
        #[cfg(feature = "tracing")]
        match &outcome {
            Ok(()) => tracing::info!(
                dispatch = %self.id,
                results = self.table.len(),
                outcome = "ok",
                "sequence.settled"
            ),
            Err(e) => tracing::warn!(
                dispatch = %self.id,
                error = %e,
                outcome = "failed",
                "sequence.settled"
            ),
        }

        outcome.map(|()| self.table)
    }
}
