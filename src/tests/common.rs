//! Common helpers for scenario tests.
//!
//! This module contains:
//! - `middleware`: a middleware over a fresh `RecordingStore`
//! - `Flag` and `Journal`: shared flags that tasks and handlers write to
//! - Task builders: `resolves`, `rejects`, `emits`
//! - `bootstrap_app`: the user/tenant sequence used across tests
//! - `UserLookup` and `Cleanup`: trait-based task and recovery handler

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::{
    async_value, BoxError, Completion, Dispatch, Element, Error, Middleware, Phunk,
    RecordingStore, Recover, ResultTable,
};

// ============================================================================
// Setup
// ============================================================================

/// A middleware in front of a store that records every action.
pub fn middleware() -> Middleware<RecordingStore> {
    Middleware::new(RecordingStore::new())
}

// ============================================================================
// Flags
// ============================================================================

/// Remembers whether something was called.
#[derive(Clone, Default)]
pub struct Flag(Arc<AtomicBool>);

impl Flag {
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ordered log of events written by tasks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

// ============================================================================
// Task Builders
// ============================================================================

/// A task that resolves to `value`.
pub fn resolves(name: &str, value: Value) -> Element {
    Element::task(name, move |_: &ResultTable| {
        let value = value.clone();
        Completion::deferred(async move { Ok(value) })
    })
}

/// A task that fails with `message`.
pub fn rejects(name: &str, message: &'static str) -> Element {
    Element::task(name, move |_: &ResultTable| {
        Completion::deferred(async move { Err(BoxError::from(message)) })
    })
}

/// A task whose stream emits `value` and then never ends.
pub fn emits(name: &str, value: Value) -> Element {
    Element::task(name, move |_: &ResultTable| {
        let first = futures::stream::iter(vec![Ok(value.clone())]);
        Completion::stream(first.chain(futures::stream::pending()))
    })
}

/// A task that sleeps, writing its start and end to `journal`.
pub fn slow(name: &str, journal: &Journal, millis: u64) -> Element {
    let journal = journal.clone();
    let label = name.to_string();
    Element::task(name, move |_: &ResultTable| {
        let journal = journal.clone();
        let label = label.clone();
        Completion::deferred(async move {
            journal.push(format!("{label}.start"));
            tokio::time::sleep(Duration::from_millis(millis)).await;
            journal.push(format!("{label}.end"));
            Ok(json!(label))
        })
    })
}

/// A recovery handler that sets `flag` and resolves.
pub fn catch_all(flag: &Flag) -> Element {
    let flag = flag.clone();
    Element::recovery(move |_| {
        let flag = flag.clone();
        Completion::deferred(async move {
            flag.set();
            Ok(Value::Null)
        })
    })
}

/// The user-then-tenant bootstrap sequence.
pub fn bootstrap_app(user_called: &Flag, tenant_called: &Flag) -> Vec<Dispatch> {
    let user_called = user_called.clone();
    let tenant_called = tenant_called.clone();

    crate::sequence![
        Element::action("GETTING_USER"),
        Element::task("loggedInUser", move |_: &ResultTable| {
            let called = user_called.clone();
            Completion::deferred(async move {
                called.set();
                Ok(json!({"id": 1, "name": "A User"}))
            })
        }),
        crate::action!("GOT_USER", user: async_value("loggedInUser").expect("name")),
        Element::action("GETTING_TENANT"),
        Element::task("tenant", move |_: &ResultTable| {
            let called = tenant_called.clone();
            Completion::deferred(async move {
                called.set();
                Ok(json!({"id": 2, "name": "A Tenant"}))
            })
        }),
        crate::action!("GOT_TENANT", tenant: async_value("tenant").expect("name")),
    ]
}

// ============================================================================
// Trait-based Task and Handler
// ============================================================================

/// Looks up the profile of the user recorded under `loggedInUser`.
pub struct UserLookup;

#[async_trait::async_trait]
impl Phunk for UserLookup {
    async fn run(&self, values: &ResultTable) -> Result<Value, BoxError> {
        let id = values
            .get("loggedInUser")
            .and_then(|user| user.get("id"))
            .and_then(Value::as_i64)
            .ok_or("no logged in user")?;
        Ok(json!({"user": id, "theme": "dark"}))
    }
}

/// Records the message of the error it handles.
pub struct Cleanup {
    pub seen: Arc<Mutex<Option<String>>>,
}

#[async_trait::async_trait]
impl Recover for Cleanup {
    async fn recover(&self, error: &Error) -> Result<Value, BoxError> {
        *self.seen.lock() = Some(error.to_string());
        Ok(Value::Null)
    }
}
