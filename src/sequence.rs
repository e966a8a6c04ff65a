//! Dispatched values and validated sequences.

use std::collections::HashSet;

use crate::action::Action;
use crate::element::{Element, Kind, Recovery, Task};
use crate::error::Error;
use crate::middleware::Config;

/// Anything that can be handed to [`Middleware::dispatch`](crate::Middleware::dispatch).
///
/// Lists may nest arbitrarily; they are flattened, in order, before a
/// sequence runs.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// A single element.
    One(Element),
    /// A (possibly nested) sequence of elements.
    Many(Vec<Dispatch>),
}

impl Dispatch {
    /// All elements in order, with nested lists spliced in place.
    pub fn flatten(self) -> Vec<Element> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            Self::One(element) => out.push(element),
            Self::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl From<Element> for Dispatch {
    fn from(element: Element) -> Self {
        Self::One(element)
    }
}

impl<T: Into<Dispatch>> From<Vec<T>> for Dispatch {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items.into_iter().map(Into::into).collect())
    }
}

/// One step of the forward walk.
pub(crate) enum Step {
    Action(Action),
    Task(Task),
}

/// A flattened sequence whose elements all passed classification.
///
/// The recovery handler, if any, is kept apart: it never runs on the
/// forward walk.
pub(crate) struct Sequence {
    pub(crate) steps: Vec<Step>,
    pub(crate) recovery: Option<Recovery>,
}

impl Sequence {
    /// Classify every element up front so shape errors surface before
    /// anything is dispatched.
    pub(crate) fn new(elements: Vec<Element>, config: &Config) -> Result<Self, Error> {
        let len = elements.len();
        let mut steps = Vec::with_capacity(len);
        let mut recovery = None;
        let mut names = HashSet::new();

        for (position, element) in elements.into_iter().enumerate() {
            match element.classify()? {
                Kind::Action(action) => steps.push(Step::Action(action)),
                Kind::Task(task) => {
                    if config.unique_task_names && !names.insert(task.name.clone()) {
                        return Err(Error::DuplicateTaskName(task.name));
                    }
                    steps.push(Step::Task(task));
                }
                Kind::Recovery(handler) if position + 1 == len => recovery = Some(handler),
                Kind::Recovery(_) => return Err(Error::MisplacedRecovery { position, len }),
            }
        }

        Ok(Self { steps, recovery })
    }
}
